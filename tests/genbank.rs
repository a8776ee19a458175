extern crate flatseq;

use flatseq::genbank::{self, CdsReader, Error};

// qualifier / continuation line with the fixed 21-column annotation indent
fn qual_line(content: &str) -> String {
    format!("{:21}{}\n", "", content)
}

fn cds_line(location: &str) -> String {
    format!("     {:16}{}\n", "CDS", location)
}

#[test]
fn test_genbank_inline_translation() {
    let mut gbk = String::new();
    gbk.push_str(&cds_line("1..9"));
    gbk.push_str(&qual_line("/gene=\"abc\""));
    gbk.push_str(&qual_line("/translation=\"MKV\""));

    let translations = CdsReader::new(gbk.as_bytes()).translations().unwrap();
    assert_eq!(translations.len(), 1);
    assert_eq!(translations[&b"abc"[..]], b"MKV".to_vec());
}

#[test]
fn test_genbank_locus_tag_fallback() {
    let mut gbk = String::new();
    gbk.push_str(&cds_line("complement(100..200)"));
    gbk.push_str(&qual_line("/locus_tag=\"B001\""));
    gbk.push_str(&qual_line("/codon_start=1"));
    gbk.push_str(&qual_line("/translation=\"MNT\""));

    let translations = CdsReader::new(gbk.as_bytes()).translations().unwrap();
    assert_eq!(translations.len(), 1);
    assert_eq!(translations[&b"B001"[..]], b"MNT".to_vec());
}

#[test]
fn test_genbank_gene_wins_over_locus_tag() {
    let mut gbk = String::new();
    gbk.push_str(&cds_line("1..9"));
    gbk.push_str(&qual_line("/gene=\"thrA\""));
    gbk.push_str(&qual_line("/locus_tag=\"b0002\""));
    gbk.push_str(&qual_line("/translation=\"MRV\""));

    let translations = CdsReader::new(gbk.as_bytes()).translations().unwrap();
    assert_eq!(translations.len(), 1);
    assert_eq!(translations[&b"thrA"[..]], b"MRV".to_vec());
}

#[test]
fn test_genbank_continuation_lines() {
    let fragments = [
        "MRVLKFGGTSVANAERFLRVADILESNARQGQVATVLSAPAKITNHLVA",
        "MIEKTISGQDALPNISDAERIFAELLTGLAAAQPGFPLAQLKTFVDQEFAQIKHVLHGI",
        "SLLGQCPDSINAALICRGEKMSIAIMAGVLEARGHNVTVIDPVEKLLAVGHYLESTVDI",
        "AESTRRIAASRIPADHMVLMAGFTAGNEKGELVVLGRNGSDYSAAVLAACLRADCCEIW",
    ];
    let full = fragments.concat();

    // translation split across an opening fragment and three continuation
    // lines, the last carrying the closing quote
    let mut split = String::new();
    split.push_str(&cds_line("1..720"));
    split.push_str(&qual_line("/gene=\"thrA\""));
    split.push_str(&qual_line(&format!("/translation=\"{}", fragments[0])));
    split.push_str(&qual_line(fragments[1]));
    split.push_str(&qual_line(fragments[2]));
    split.push_str(&qual_line(&format!("{}\"", fragments[3])));

    // the same value given inline on a single line
    let mut inline = String::new();
    inline.push_str(&cds_line("1..720"));
    inline.push_str(&qual_line("/gene=\"thrA\""));
    inline.push_str(&qual_line(&format!("/translation=\"{}\"", full)));

    let from_split = CdsReader::new(split.as_bytes()).translations().unwrap();
    let from_inline = CdsReader::new(inline.as_bytes()).translations().unwrap();

    assert_eq!(from_split[&b"thrA"[..]], full.as_bytes().to_vec());
    assert_eq!(from_split, from_inline);
}

#[test]
fn test_genbank_multiple_blocks_in_order() {
    let mut gbk = String::new();
    gbk.push_str("LOCUS       TEST 100 bp DNA linear\n");
    gbk.push_str("FEATURES             Location/Qualifiers\n");
    gbk.push_str(&cds_line("1..9"));
    gbk.push_str(&qual_line("/gene=\"aaa\""));
    gbk.push_str(&qual_line("/translation=\"MA\""));
    gbk.push_str(&cds_line("20..29"));
    gbk.push_str(&qual_line("/gene=\"bbb\""));
    gbk.push_str(&qual_line("/translation=\"MB\""));

    let mut reader = CdsReader::new(gbk.as_bytes());
    let first = reader.next_cds().unwrap().unwrap();
    assert_eq!(first.name(), Ok("aaa"));
    assert_eq!(first.translation(), Ok("MA"));
    let second = reader.next_cds().unwrap().unwrap();
    assert_eq!(second.name(), Ok("bbb"));
    assert_eq!(second.translation(), Ok("MB"));
    assert!(reader.next_cds().is_none());
    assert!(reader.next_cds().is_none());
}

#[test]
fn test_genbank_repeated_name_last_write_wins() {
    let mut gbk = String::new();
    gbk.push_str(&cds_line("1..9"));
    gbk.push_str(&qual_line("/gene=\"dup\""));
    gbk.push_str(&qual_line("/translation=\"FIRST\""));
    gbk.push_str(&cds_line("20..29"));
    gbk.push_str(&qual_line("/gene=\"dup\""));
    gbk.push_str(&qual_line("/translation=\"SECOND\""));

    // the mapping keeps the later entry
    let translations = CdsReader::new(gbk.as_bytes()).translations().unwrap();
    assert_eq!(translations.len(), 1);
    assert_eq!(translations[&b"dup"[..]], b"SECOND".to_vec());

    // streaming access still sees both entries
    let mut reader = CdsReader::new(gbk.as_bytes());
    let mut seen = vec![];
    while let Some(cds) = reader.next_cds() {
        seen.push(cds.unwrap().translation);
    }
    assert_eq!(seen, vec![b"FIRST".to_vec(), b"SECOND".to_vec()]);
}

#[test]
fn test_genbank_missing_name() {
    let mut gbk = String::new();
    gbk.push_str(&cds_line("1..9"));
    gbk.push_str(&qual_line("/codon_start=1"));
    gbk.push_str(&qual_line("/translation=\"MKV\""));

    let mut reader = CdsReader::new(gbk.as_bytes());
    match reader.next_cds().unwrap() {
        Err(Error::MissingName { line }) => assert_eq!(line, 3),
        other => panic!("expected MissingName, got {:?}", other),
    }
    assert!(reader.next_cds().is_none());
}

#[test]
fn test_genbank_truncated_block_dropped() {
    let _ = env_logger::builder().is_test(true).try_init();

    let mut gbk = String::new();
    gbk.push_str(&cds_line("1..9"));
    gbk.push_str(&qual_line("/gene=\"whole\""));
    gbk.push_str(&qual_line("/translation=\"MKV\""));
    gbk.push_str(&cds_line("20..220"));
    gbk.push_str(&qual_line("/gene=\"cut\""));
    gbk.push_str(&qual_line("/translation=\"MRVLKFGGTSVANAERFLRVADILESNA"));
    gbk.push_str(&qual_line("MIEKTISGQDALPNISDAERIFAELLTG"));
    // input ends before the closing quote

    let translations = CdsReader::new(gbk.as_bytes()).translations().unwrap();
    assert_eq!(translations.len(), 1);
    assert!(translations.contains_key(&b"whole"[..].to_vec()));
}

#[test]
fn test_genbank_no_cds() {
    let gbk = b"LOCUS       TEST 100 bp DNA linear\nORIGIN\n        1 acgtacgtac\n//\n";
    let translations = CdsReader::new(&gbk[..]).translations().unwrap();
    assert!(translations.is_empty());

    let translations = CdsReader::new(&b""[..]).translations().unwrap();
    assert!(translations.is_empty());
}

#[test]
fn test_genbank_crlf() {
    let mut gbk = String::new();
    gbk.push_str(&cds_line("1..9"));
    gbk.push_str(&qual_line("/gene=\"abc\""));
    gbk.push_str(&qual_line("/translation=\"MK"));
    gbk.push_str(&qual_line("VL\""));
    let gbk = gbk.replace('\n', "\r\n");

    let translations = CdsReader::new(gbk.as_bytes()).translations().unwrap();
    assert_eq!(translations[&b"abc"[..]], b"MKVL".to_vec());
}

#[test]
fn test_genbank_gene_resolved_on_first_block_line() {
    // a /gene qualifier that is not the first line after CDS is not
    // captured; the entry falls back to the locus tag
    let mut gbk = String::new();
    gbk.push_str(&cds_line("1..9"));
    gbk.push_str(&qual_line("/locus_tag=\"B002\""));
    gbk.push_str(&qual_line("/gene=\"late\""));
    gbk.push_str(&qual_line("/translation=\"MSS\""));

    let translations = CdsReader::new(gbk.as_bytes()).translations().unwrap();
    assert_eq!(translations.len(), 1);
    assert_eq!(translations[&b"B002"[..]], b"MSS".to_vec());
}

#[test]
fn test_genbank_write_fasta() {
    let mut gbk = String::new();
    gbk.push_str(&cds_line("1..9"));
    gbk.push_str(&qual_line("/gene=\"aaa\""));
    gbk.push_str(&qual_line("/translation=\"MA\""));
    gbk.push_str(&cds_line("20..29"));
    gbk.push_str(&qual_line("/locus_tag=\"B003\""));
    gbk.push_str(&qual_line("/translation=\"MB\""));

    let mut reader = CdsReader::new(gbk.as_bytes());
    let mut out = vec![];
    let n = genbank::write_fasta(&mut reader, &mut out).unwrap();
    assert_eq!(n, 2);
    assert_eq!(&out[..], &b">aaa\nMA\n\n>B003\nMB\n\n"[..]);
}
