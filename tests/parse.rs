use ini_config::{
    parse, CollisionFlags, ErrorCode, ErrorLevel, ParseFlags, ParseOutcome, SectionPolicy, ValuePolicy,
    BUFFER_SIZE, DEFAULT_SECTION, MAX_KEY,
};

fn ok(input: &str, flags: CollisionFlags) -> ini_config::Config {
    match parse(input.as_bytes(), ErrorLevel::StopOnNone, flags, ParseFlags::default(), None).unwrap() {
        ParseOutcome::Ok(config) => config,
        other => panic!("expected Ok, got {other:?}"),
    }
}

#[test]
fn s1_duplicate_key_under_error_returns_fatal_with_first_value_kept() {
    let flags = CollisionFlags {
        section: SectionPolicy::Merge,
        value_within_section: ValuePolicy::Error,
        value_across_sections: ValuePolicy::Overwrite,
    };
    match parse("[a]\nk=1\nk=2\n".as_bytes(), ErrorLevel::StopOnNone, flags, ParseFlags::default(), None).unwrap() {
        ParseOutcome::Fatal(diags) => {
            assert_eq!(diags.len(), 1);
            assert_eq!(diags[0].line, 3);
            assert_eq!(diags[0].code, ErrorCode::DupKey);
        }
        other => panic!("expected Fatal, got {other:?}"),
    }
}

#[test]
fn s2_allow_within_overwrite_across_sections() {
    let flags = CollisionFlags {
        section: SectionPolicy::Merge,
        value_within_section: ValuePolicy::Allow,
        value_across_sections: ValuePolicy::Overwrite,
    };
    let config = ok("[a]\nk=1\n[a]\nk=2\n", flags);
    let section = config.get("a").unwrap();
    assert_eq!(section.len(), 1);
    assert_eq!(section.get("k").unwrap().as_bytes(), b"2");
}

#[test]
fn s3_folded_value_has_two_fragments() {
    let config = ok("[a]\nk=one\n two\n", CollisionFlags::merge_all());
    let value = config.get("a").unwrap().get("k").unwrap();
    assert_eq!(value.fragments(), &[b"one".to_vec(), b" two".to_vec()]);
}

#[test]
fn s4_comment_before_header_lands_on_the_section() {
    let config = ok("; top\n[a]\nk=1\n", CollisionFlags::merge_all());
    let section = config.get("a").unwrap();
    let comment = section.header_comment().unwrap();
    assert_eq!(&comment.lines().next().unwrap()[..], b"; top");
    assert!(section.get("k").unwrap().comment().is_none());
}

#[test]
fn blank_separator_line_is_not_an_error() {
    let config = ok("[a]\nk=1\n\nj=2\n", CollisionFlags::merge_all());
    let section = config.get("a").unwrap();
    assert_eq!(section.get("k").unwrap().as_bytes(), b"1");
    assert_eq!(section.get("j").unwrap().as_bytes(), b"2");
    assert!(config.diagnostics().is_empty());
}

#[test]
fn s5_unterminated_block_comment_is_fatal() {
    match parse(
        "/* unterminated\n".as_bytes(),
        ErrorLevel::StopOnNone,
        CollisionFlags::merge_all(),
        ParseFlags::default(),
        None,
    )
    .unwrap()
    {
        ParseOutcome::Fatal(diags) => {
            // `LineSource` bumps the line counter before it discovers EOF,
            // matching `parser_read`'s unconditional `po->linenum++` ahead
            // of the getline check, so an EOF found while still inside a
            // block comment reports the line past the last one actually read.
            assert_eq!(diags[0].line, 2);
            assert_eq!(diags[0].code, ErrorCode::BadComment);
        }
        other => panic!("expected Fatal, got {other:?}"),
    }
}

#[test]
fn s6_orphan_keys_collect_into_default_section() {
    let config = ok("k=1\n[a]\nk=2\n", CollisionFlags::merge_all());
    assert_eq!(config.get(DEFAULT_SECTION).unwrap().get("k").unwrap().as_bytes(), b"1");
    assert_eq!(config.get("a").unwrap().get("k").unwrap().as_bytes(), b"2");
}

#[test]
fn invariant_preserve_keeps_first_occurrence() {
    let flags = CollisionFlags {
        section: SectionPolicy::Merge,
        value_within_section: ValuePolicy::Preserve,
        value_across_sections: ValuePolicy::Preserve,
    };
    let config = ok("[a]\nk=1\nk=2\nk=3\n", flags);
    let section = config.get("a").unwrap();
    assert_eq!(section.len(), 1);
    assert_eq!(section.get("k").unwrap().as_bytes(), b"1");
}

#[test]
fn invariant_overwrite_keeps_last_occurrence_with_its_own_line() {
    let flags = CollisionFlags {
        section: SectionPolicy::Merge,
        value_within_section: ValuePolicy::Overwrite,
        value_across_sections: ValuePolicy::Overwrite,
    };
    let config = ok("[a]\nk=1\nk=2\nk=3\n", flags);
    let value = config.get("a").unwrap().get("k").unwrap();
    assert_eq!(value.as_bytes(), b"3");
    assert_eq!(value.origin_line(), 4);
}

#[test]
fn invariant_allow_keeps_every_occurrence_in_order() {
    let flags = CollisionFlags {
        section: SectionPolicy::Merge,
        value_within_section: ValuePolicy::Allow,
        value_across_sections: ValuePolicy::Allow,
    };
    let config = ok("[a]\nk=1\nk=2\nk=3\n", flags);
    let section = config.get("a").unwrap();
    assert_eq!(section.len(), 3);
    let values: Vec<&[u8]> = section.iter().map(|(_, v)| v.as_bytes()).collect();
    assert_eq!(values, vec![b"1" as &[u8], b"2", b"3"]);
}

#[test]
fn invariant_every_value_has_at_least_one_fragment() {
    let config = ok("[a]\nk=\n", CollisionFlags::merge_all());
    let value = config.get("a").unwrap().get("k").unwrap();
    assert_eq!(value.fragments().len(), 1);
}

#[test]
fn invariant_folding_fragment_count_matches_span() {
    let config = ok("[a]\nk=one\n two\n three\n", CollisionFlags::merge_all());
    let value = config.get("a").unwrap().get("k").unwrap();
    assert_eq!(value.fragments().len(), 3);
}

#[test]
fn round_trip_canonical_input_is_semantically_stable() {
    let input = "[a]\nj = 1\nk = 2\n[b]\nm = 3\n";
    let first = ok(input, CollisionFlags::merge_all());
    let mut buf = Vec::new();
    first.write_to(&mut buf).unwrap();
    let second = ok(std::str::from_utf8(&buf).unwrap(), CollisionFlags::merge_all());
    assert_eq!(first.get("a").unwrap().len(), second.get("a").unwrap().len());
    assert_eq!(first.get("a").unwrap().get("j").unwrap().as_bytes(), second.get("a").unwrap().get("j").unwrap().as_bytes());
    assert_eq!(first.get("b").unwrap().get("m").unwrap().as_bytes(), second.get("b").unwrap().get("m").unwrap().as_bytes());
}

#[test]
fn detect_mode_is_stable_across_repeated_parses() {
    let flags = CollisionFlags {
        section: SectionPolicy::Merge,
        value_within_section: ValuePolicy::Detect,
        value_across_sections: ValuePolicy::Overwrite,
    };
    let input = "[a]\nk=1\nk=2\nj=3\nj=4\n";
    let diags_of = |input: &str| match parse(input.as_bytes(), ErrorLevel::StopOnNone, flags, ParseFlags::default(), None).unwrap() {
        ParseOutcome::DuplicateDetected(config) => config.diagnostics().to_vec(),
        other => panic!("expected DuplicateDetected, got {other:?}"),
    };
    assert_eq!(diags_of(input), diags_of(input));
}

#[test]
fn boundary_key_length() {
    let ok_key = "k".repeat(MAX_KEY - 1);
    let input = format!("[a]\n{ok_key}=1\n");
    let config = ok(&input, CollisionFlags::merge_all());
    assert!(config.get("a").unwrap().get(&ok_key).is_some());

    let too_long_key = "k".repeat(MAX_KEY);
    let input = format!("[a]\n{too_long_key}=1\n");
    match parse(input.as_bytes(), ErrorLevel::StopOnNone, CollisionFlags::merge_all(), ParseFlags::default(), None).unwrap() {
        ParseOutcome::Fatal(diags) => assert_eq!(diags[0].code, ErrorCode::LongKey),
        other => panic!("expected Fatal, got {other:?}"),
    }
}

#[test]
fn boundary_line_length() {
    let value = "v".repeat(BUFFER_SIZE - 1 - "k=".len());
    let input = format!("[a]\nk={value}\n");
    let config = ok(&input, CollisionFlags::merge_all());
    assert_eq!(config.get("a").unwrap().get("k").unwrap().as_bytes().len(), value.len());

    let too_long_value = "v".repeat(BUFFER_SIZE - "k=".len());
    let input = format!("[a]\nk={too_long_value}\n");
    match parse(input.as_bytes(), ErrorLevel::StopOnNone, CollisionFlags::merge_all(), ParseFlags::default(), None).unwrap() {
        ParseOutcome::Fatal(diags) => assert_eq!(diags[0].code, ErrorCode::LongData),
        other => panic!("expected Fatal, got {other:?}"),
    }
}

#[test]
fn section_error_policy_keeps_only_the_first_section() {
    let flags = CollisionFlags {
        section: SectionPolicy::Error,
        value_within_section: ValuePolicy::Overwrite,
        value_across_sections: ValuePolicy::Overwrite,
    };
    match parse(
        "[a]\nk=1\n[a]\nk=2\n".as_bytes(),
        ErrorLevel::StopOnNone,
        flags,
        ParseFlags::default(),
        None,
    )
    .unwrap()
    {
        ParseOutcome::Fatal(diags) => {
            assert_eq!(diags[0].code, ErrorCode::DupSection);
        }
        other => panic!("expected Fatal, got {other:?}"),
    }
}

#[test]
fn wrap_boundary_is_stamped_onto_every_value() {
    match parse(
        "[a]\nj=1\nk=2\n".as_bytes(),
        ErrorLevel::StopOnNone,
        CollisionFlags::merge_all(),
        ParseFlags::default(),
        Some(72),
    )
    .unwrap()
    {
        ParseOutcome::Ok(config) => {
            let section = config.get("a").unwrap();
            assert_eq!(section.get("j").unwrap().wrap_boundary(), Some(72));
            assert_eq!(section.get("k").unwrap().wrap_boundary(), Some(72));
        }
        other => panic!("expected Ok, got {other:?}"),
    }
}

#[test]
fn invalid_collision_flags_are_rejected_before_any_parsing() {
    let flags = CollisionFlags {
        section: SectionPolicy::Detect,
        value_within_section: ValuePolicy::Error,
        value_across_sections: ValuePolicy::Overwrite,
    };
    assert!(parse("[a]\nk=1\n".as_bytes(), ErrorLevel::StopOnNone, flags, ParseFlags::default(), None).is_err());
}
