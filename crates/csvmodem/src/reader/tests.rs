use crate::{Dialect, Error, ErrorMode, LineReader, Multiline, SplitError};

fn reader(data: &str, dialect: &Dialect) -> LineReader<&'static [u8]> {
    // Tests only; leaking keeps the reader free of a lifetime parameter.
    let data: &'static [u8] = Box::leak(data.as_bytes().to_vec().into_boxed_slice());
    match LineReader::new(data, "buffer", dialect, ErrorMode::Raise) {
        Ok(r) => r,
        Err(e) => panic!("reader construction failed: {e}"),
    }
}

/// Reads the next logical line and returns its fields as strings.
fn next_fields<R: std::io::BufRead>(reader: &mut LineReader<R>) -> Option<Vec<String>> {
    match reader.read_next() {
        Ok(true) => Some(reader.peek_fields()),
        Ok(false) => None,
        Err(e) => panic!("read failed: {e}"),
    }
}

#[test]
fn reads_lines_in_order() {
    let mut r = reader("a,b\nc,d\ne,f\n", &Dialect::default());
    assert_eq!(next_fields(&mut r), Some(vec!["a".into(), "b".into()]));
    assert_eq!(next_fields(&mut r), Some(vec!["c".into(), "d".into()]));
    assert_eq!(next_fields(&mut r), Some(vec!["e".into(), "f".into()]));
    assert_eq!(next_fields(&mut r), None);
    assert_eq!(r.line_number(), 3);
}

#[test]
fn final_line_without_terminator() {
    let mut r = reader("a,b\nc,d", &Dialect::default());
    assert_eq!(next_fields(&mut r), Some(vec!["a".into(), "b".into()]));
    assert_eq!(next_fields(&mut r), Some(vec!["c".into(), "d".into()]));
    assert_eq!(next_fields(&mut r), None);
}

#[test]
fn crlf_terminators_are_stripped() {
    let mut r = reader("a,b\r\nc,d\r\n", &Dialect::default());
    assert_eq!(next_fields(&mut r), Some(vec!["a".into(), "b".into()]));
    assert_eq!(next_fields(&mut r), Some(vec!["c".into(), "d".into()]));
}

#[test]
fn byte_offset_includes_terminators() {
    let mut r = reader("a\r\nbb\n", &Dialect::default());
    assert!(matches!(r.read_next(), Ok(true)));
    assert_eq!(r.byte_offset(), 3);
    assert!(matches!(r.read_next(), Ok(true)));
    assert_eq!(r.byte_offset(), 6);
}

#[test]
fn empty_lines_are_records_by_default() {
    let mut r = reader("a\n\nb\n", &Dialect::default());
    assert_eq!(next_fields(&mut r), Some(vec!["a".into()]));
    assert_eq!(next_fields(&mut r), Some(Vec::new()));
    assert_eq!(next_fields(&mut r), Some(vec!["b".into()]));
}

#[test]
fn ignore_empty_skips_but_still_counts_lines() {
    let dialect = Dialect {
        ignore_empty: true,
        ..Dialect::default()
    };
    let mut r = reader("a\n\n\nb\n", &dialect);
    assert_eq!(next_fields(&mut r), Some(vec!["a".into()]));
    assert_eq!(next_fields(&mut r), Some(vec!["b".into()]));
    assert_eq!(r.line_number(), 4);
    assert_eq!(next_fields(&mut r), None);
}

#[test]
fn quoted_records_stitch_across_lines() {
    let dialect = Dialect {
        quote: Some(b'"'),
        multiline: Some(Multiline { limit: 0 }),
        ..Dialect::default()
    };
    let mut r = reader("\"a\nb\",c\nx,y\n", &dialect);
    assert_eq!(next_fields(&mut r), Some(vec!["a\nb".into(), "c".into()]));
    assert_eq!(r.line_number(), 2);
    assert_eq!(next_fields(&mut r), Some(vec!["x".into(), "y".into()]));
}

#[test]
fn stitched_crlf_is_preserved_inside_the_field() {
    let dialect = Dialect {
        quote: Some(b'"'),
        multiline: Some(Multiline { limit: 0 }),
        ..Dialect::default()
    };
    let mut r = reader("\"a\r\nb\",c\r\n", &dialect);
    assert_eq!(next_fields(&mut r), Some(vec!["a\r\nb".into(), "c".into()]));
}

#[test]
fn multi_byte_delimiter_straddles_a_stitch() {
    let dialect = Dialect {
        delimiter: "::".to_string(),
        quote: Some(b'"'),
        multiline: Some(Multiline { limit: 0 }),
        ..Dialect::default()
    };
    let mut r = reader("\"x\ny\"::z\n", &dialect);
    assert_eq!(next_fields(&mut r), Some(vec!["x\ny".into(), "z".into()]));
}

#[test]
fn escaped_terminator_stitches() {
    let dialect = Dialect {
        escape: Some(b'\\'),
        multiline: Some(Multiline { limit: 0 }),
        ..Dialect::default()
    };
    let mut r = reader("a\\\nb,c\n", &dialect);
    assert_eq!(next_fields(&mut r), Some(vec!["a\nb".into(), "c".into()]));
}

#[test]
fn doubled_escape_does_not_stitch() {
    let dialect = Dialect {
        escape: Some(b'\\'),
        multiline: Some(Multiline { limit: 0 }),
        ..Dialect::default()
    };
    let mut r = reader("a\\\\\nb\n", &dialect);
    assert_eq!(next_fields(&mut r), Some(vec!["a\\".into()]));
    assert_eq!(next_fields(&mut r), Some(vec!["b".into()]));
}

#[test]
fn escapes_inside_a_quoted_stitch() {
    let dialect = Dialect {
        quote: Some(b'"'),
        escape: Some(b'\\'),
        multiline: Some(Multiline { limit: 0 }),
        ..Dialect::default()
    };
    let mut r = reader("\"a\\\"b\nc\",d\n", &dialect);
    assert_eq!(next_fields(&mut r), Some(vec!["a\"b\nc".into(), "d".into()]));
}

#[test]
fn stitch_limit_surfaces_as_split_error() {
    let dialect = Dialect {
        quote: Some(b'"'),
        multiline: Some(Multiline { limit: 1 }),
        ..Dialect::default()
    };
    let mut r = reader("\"a\nb\nc\",d\nx\n", &dialect);
    assert!(matches!(r.read_next(), Ok(true)));
    r.advance();
    let err = match r.convert_current::<(String, String)>() {
        Err(e) => e,
        Ok(_) => panic!("limit of one stitched line must fail"),
    };
    assert!(matches!(
        err,
        Error::Split(SplitError::MultilineLimitReached)
    ));
}

#[test]
fn eof_inside_quote_reports_unterminated() {
    let dialect = Dialect {
        quote: Some(b'"'),
        multiline: Some(Multiline { limit: 0 }),
        ..Dialect::default()
    };
    let mut r = reader("\"never closed\nstill open", &dialect);
    assert!(matches!(r.read_next(), Ok(true)));
    r.advance();
    let err = match r.convert_current::<(String,)>() {
        Err(e) => e,
        Ok(_) => panic!("open quote at end of input must fail"),
    };
    assert!(matches!(err, Error::Split(SplitError::UnterminatedQuote)));
    assert!(matches!(r.read_next(), Ok(false)));
}

#[test]
fn eof_after_escape_reports_unterminated() {
    let dialect = Dialect {
        escape: Some(b'\\'),
        multiline: Some(Multiline { limit: 0 }),
        ..Dialect::default()
    };
    let mut r = reader("tail\\\n", &dialect);
    assert!(matches!(r.read_next(), Ok(true)));
    r.advance();
    let err = match r.convert_current::<(String,)>() {
        Err(e) => e,
        Ok(_) => panic!("open escape at end of input must fail"),
    };
    assert!(matches!(err, Error::Split(SplitError::UnterminatedEscape)));
}

#[test]
fn lookahead_survives_until_advance() {
    let mut r = reader("head1,head2\n1,2\n", &Dialect::default());
    assert!(matches!(r.read_next(), Ok(true)));
    let header = r.peek_fields();
    assert_eq!(header, vec!["head1".to_string(), "head2".to_string()]);

    // The header line is still intact in the lookahead slot; consuming it
    // and fetching the next record must produce the data row.
    r.advance();
    assert!(matches!(r.read_next(), Ok(true)));
    r.advance();
    let record = r.convert_current::<(i32, i32)>();
    assert_eq!(record.ok(), Some((1, 2)));
}

#[test]
fn mapping_applies_to_both_slots() {
    let mut r = reader("a,b,c\nd,e,f\n", &Dialect::default());
    assert!(r.set_column_mapping(&[2], 3).is_ok());
    assert!(matches!(r.read_next(), Ok(true)));
    r.advance();
    assert_eq!(
        r.convert_current::<(String,)>().ok(),
        Some(("c".to_string(),))
    );
    assert!(matches!(r.read_next(), Ok(true)));
    r.advance();
    assert_eq!(
        r.convert_current::<(String,)>().ok(),
        Some(("f".to_string(),))
    );
}
