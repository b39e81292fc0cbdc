//! Parser pipeline tests: the engine scenarios observed through parse
//! trees and listeners.

use taul_core::Qualifier;
use taul_spec::SpecWriter;

use crate::parser::{parse_str, Parser};
use crate::lexer::Lexer;
use crate::string_reader::StringReader;
use crate::test_support::{lexical, lexical_failure, load, syntactic, TraceEvent, TraceListener};
use crate::tree::ParseTree;

fn playback_events(tree: &ParseTree) -> Vec<TraceEvent> {
    let mut listener = TraceListener::default();
    tree.playback(&mut listener);
    listener.events
}

/// LPRs `A:'a'`, `B:'b'`, `C:'c'` plus one PPR `f` built by `body`.
fn abc_grammar(body: impl FnOnce(SpecWriter) -> SpecWriter) -> taul_core::Grammar {
    let writer = SpecWriter::new()
        .lpr_decl("A")
        .lpr_decl("B")
        .lpr_decl("C")
        .ppr_decl("f")
        .lpr("A", Qualifier::None)
        .string("a")
        .close()
        .lpr("B", Qualifier::None)
        .string("b")
        .close()
        .lpr("C", Qualifier::None)
        .string("c")
        .close()
        .ppr("f", Qualifier::None);
    let spec = body(writer).close().done();
    load(&spec)
}

#[test]
fn sequence_match() {
    // f: A B C A B C over "abcabc"
    let gram = abc_grammar(|w| {
        w.name("A")
            .name("B")
            .name("C")
            .name("A")
            .name("B")
            .name("C")
    });
    let tree = parse_str(&gram, "f", "abcabc");
    assert!(tree.is_sealed());
    assert!(!tree.is_aborted());
    assert_eq!(
        playback_events(&tree),
        vec![
            TraceEvent::Startup,
            syntactic(0, 0),
            lexical(0, 0, 1),
            lexical(1, 1, 1),
            lexical(2, 2, 1),
            lexical(0, 3, 1),
            lexical(1, 4, 1),
            lexical(2, 5, 1),
            TraceEvent::Close,
            TraceEvent::Shutdown,
        ]
    );
}

#[test]
fn abort_on_mismatch() {
    // f: A B C A B C over "abcad": aborts at the failure token
    let gram = abc_grammar(|w| {
        w.name("A")
            .name("B")
            .name("C")
            .name("A")
            .name("B")
            .name("C")
    });
    let tree = parse_str(&gram, "f", "abcad");
    assert!(tree.is_aborted());
    assert_eq!(tree.abort_pos(), Some(4));
    assert_eq!(
        playback_events(&tree),
        vec![
            TraceEvent::Startup,
            syntactic(0, 0),
            lexical(0, 0, 1),
            lexical(1, 1, 1),
            lexical(2, 2, 1),
            lexical(0, 3, 1),
            TraceEvent::Abort(4),
            TraceEvent::Close,
            TraceEvent::Shutdown,
        ]
    );
}

#[test]
fn alternation_chooses_by_lookahead() {
    // f: A | B | (empty)
    let make = || abc_grammar(|w| w.name("A").alternative().name("B").alternative());

    let tree = parse_str(&make(), "f", "a");
    assert_eq!(
        playback_events(&tree),
        vec![
            TraceEvent::Startup,
            syntactic(0, 0),
            lexical(0, 0, 1),
            TraceEvent::Close,
            TraceEvent::Shutdown,
        ]
    );

    let tree = parse_str(&make(), "f", "b");
    assert_eq!(
        playback_events(&tree),
        vec![
            TraceEvent::Startup,
            syntactic(0, 0),
            lexical(1, 0, 1),
            TraceEvent::Close,
            TraceEvent::Shutdown,
        ]
    );

    let tree = parse_str(&make(), "f", "");
    assert_eq!(
        playback_events(&tree),
        vec![
            TraceEvent::Startup,
            syntactic(0, 0),
            TraceEvent::Close,
            TraceEvent::Shutdown,
        ]
    );
}

#[test]
fn recursive_rule_nests() {
    // f: A f | (empty) over "aaa": three nested fs, one empty f
    let gram = abc_grammar(|w| w.name("A").name("f").alternative());
    let tree = parse_str(&gram, "f", "aaa");
    assert_eq!(
        playback_events(&tree),
        vec![
            TraceEvent::Startup,
            syntactic(0, 0),
            lexical(0, 0, 1),
            syntactic(0, 1),
            lexical(0, 1, 1),
            syntactic(0, 2),
            lexical(0, 2, 1),
            syntactic(0, 3),
            TraceEvent::Close,
            TraceEvent::Close,
            TraceEvent::Close,
            TraceEvent::Close,
            TraceEvent::Shutdown,
        ]
    );
}

#[test]
fn kleene_plus_requires_one_match() {
    // f: A+
    let make = || abc_grammar(|w| w.kleene_plus().name("A").close());

    let tree = parse_str(&make(), "f", "");
    assert!(tree.is_aborted());
    assert_eq!(
        playback_events(&tree),
        vec![
            TraceEvent::Startup,
            syntactic(0, 0),
            TraceEvent::Abort(0),
            TraceEvent::Close,
            TraceEvent::Shutdown,
        ]
    );

    let tree = parse_str(&make(), "f", "aaa");
    assert_eq!(
        playback_events(&tree),
        vec![
            TraceEvent::Startup,
            syntactic(0, 0),
            lexical(0, 0, 1),
            lexical(0, 1, 1),
            lexical(0, 2, 1),
            TraceEvent::Close,
            TraceEvent::Shutdown,
        ]
    );
}

#[test]
fn lookahead_matches_without_consuming() {
    // f: &A
    let make = || abc_grammar(|w| w.lookahead().name("A").close());

    // the asserted token is neither consumed nor emitted
    let tree = parse_str(&make(), "f", "a");
    assert_eq!(
        playback_events(&tree),
        vec![
            TraceEvent::Startup,
            syntactic(0, 0),
            TraceEvent::Close,
            TraceEvent::Shutdown,
        ]
    );

    // any other token aborts before consuming
    for input in ["b", "c", "d", ""] {
        let tree = parse_str(&make(), "f", input);
        assert!(tree.is_aborted(), "input {input:?} should abort");
        assert_eq!(tree.abort_pos(), Some(0));
    }
}

#[test]
fn negated_lookahead_inverts_the_assertion() {
    // f: -A matches any lookahead except A, including failure tokens, but
    // not end-of-input
    let make = || abc_grammar(|w| w.lookahead_not().name("A").close());

    for input in ["b", "c", "d"] {
        let tree = parse_str(&make(), "f", input);
        assert!(!tree.is_aborted(), "input {input:?} should match");
        assert_eq!(
            playback_events(&tree),
            vec![
                TraceEvent::Startup,
                syntactic(0, 0),
                TraceEvent::Close,
                TraceEvent::Shutdown,
            ]
        );
    }

    for input in ["a", ""] {
        let tree = parse_str(&make(), "f", input);
        assert!(tree.is_aborted(), "input {input:?} should abort");
        assert_eq!(tree.abort_pos(), Some(0));
    }
}

#[test]
fn end_asserts_end_of_input_silently() {
    // f: A B C end
    let gram = abc_grammar(|w| w.name("A").name("B").name("C").end());
    let tree = parse_str(&gram, "f", "abc");
    // no lexical event for end
    assert_eq!(
        playback_events(&tree),
        vec![
            TraceEvent::Startup,
            syntactic(0, 0),
            lexical(0, 0, 1),
            lexical(1, 1, 1),
            lexical(2, 2, 1),
            TraceEvent::Close,
            TraceEvent::Shutdown,
        ]
    );

    let tree = parse_str(&gram, "f", "abca");
    assert!(tree.is_aborted());
    assert_eq!(tree.abort_pos(), Some(3));
}

#[test]
fn not_consumes_the_complement() {
    // f: ~A consumes any one token that is not A
    let gram = abc_grammar(|w| w.not().name("A").close());
    let tree = parse_str(&gram, "f", "b");
    assert_eq!(
        playback_events(&tree),
        vec![
            TraceEvent::Startup,
            syntactic(0, 0),
            lexical(1, 0, 1),
            TraceEvent::Close,
            TraceEvent::Shutdown,
        ]
    );

    // a failure token is in the complement too
    let gram = abc_grammar(|w| w.not().name("A").close());
    let tree = parse_str(&gram, "f", "z");
    assert_eq!(
        playback_events(&tree),
        vec![
            TraceEvent::Startup,
            syntactic(0, 0),
            lexical_failure(0, 1),
            TraceEvent::Close,
            TraceEvent::Shutdown,
        ]
    );
}

#[test]
fn optional_and_star_build_no_visible_structure() {
    // f: A? B* end
    let gram = abc_grammar(|w| {
        w.optional()
            .name("A")
            .close()
            .kleene_star()
            .name("B")
            .close()
            .end()
    });
    let tree = parse_str(&gram, "f", "abbb");
    assert_eq!(
        playback_events(&tree),
        vec![
            TraceEvent::Startup,
            syntactic(0, 0),
            lexical(0, 0, 1),
            lexical(1, 1, 1),
            lexical(1, 2, 1),
            lexical(1, 3, 1),
            TraceEvent::Close,
            TraceEvent::Shutdown,
        ]
    );

    let tree = parse_str(&gram, "f", "");
    assert!(!tree.is_aborted());
}

#[test]
fn live_listener_and_playback_agree() {
    let gram = abc_grammar(|w| w.name("A").name("B").name("C"));
    let mut reader = StringReader::new("abc");
    let mut lexer = Lexer::new(gram.clone());
    lexer.bind_source(&mut reader);
    let mut listener = TraceListener::default();
    let mut parser = Parser::new(gram.clone());
    parser.bind_source(&mut lexer);
    parser.bind_listener(&mut listener);
    parser.reset();
    let tree = parser.parse("f");

    let live = listener.events;
    assert_eq!(live, playback_events(&tree));
}

#[test]
fn parse_notree_only_drives_the_listener() {
    let gram = abc_grammar(|w| w.name("A"));
    let mut reader = StringReader::new("a");
    let mut lexer = Lexer::new(gram.clone());
    lexer.bind_source(&mut reader);
    let mut listener = TraceListener::default();
    let mut parser = Parser::new(gram.clone());
    parser.bind_source(&mut lexer);
    parser.bind_listener(&mut listener);
    parser.reset();
    parser.parse_notree("f");

    assert_eq!(
        listener.events,
        vec![
            TraceEvent::Startup,
            syntactic(0, 0),
            lexical(0, 0, 1),
            TraceEvent::Close,
            TraceEvent::Shutdown,
        ]
    );
}

#[test]
fn repeated_parses_advance_the_stream() {
    // f: A B, parsed twice over "abab"
    let gram = abc_grammar(|w| w.name("A").name("B"));
    let mut reader = StringReader::new("abab");
    let mut lexer = Lexer::new(gram.clone());
    lexer.bind_source(&mut reader);
    let mut parser = Parser::new(gram.clone());
    parser.bind_source(&mut lexer);
    parser.reset();

    let first = parser.parse("f");
    let second = parser.parse("f");
    assert_eq!(
        playback_events(&first),
        vec![
            TraceEvent::Startup,
            syntactic(0, 0),
            lexical(0, 0, 1),
            lexical(1, 1, 1),
            TraceEvent::Close,
            TraceEvent::Shutdown,
        ]
    );
    assert_eq!(
        playback_events(&second),
        vec![
            TraceEvent::Startup,
            syntactic(0, 2),
            lexical(0, 2, 1),
            lexical(1, 3, 1),
            TraceEvent::Close,
            TraceEvent::Shutdown,
        ]
    );
}

#[test]
fn terminal_positions_are_non_decreasing() {
    let gram = abc_grammar(|w| {
        w.kleene_star()
            .name("A")
            .alternative()
            .name("B")
            .alternative()
            .name("C")
            .close()
            .end()
    });
    let tree = parse_str(&gram, "f", "abccba");
    let events = playback_events(&tree);
    let mut last_pos = 0;
    let mut terminals = 0;
    for event in events {
        if let TraceEvent::Lexical(token) = event {
            assert!(token.pos >= last_pos);
            last_pos = token.pos;
            terminals += 1;
        }
    }
    assert_eq!(terminals, 6);
}

#[test]
fn serialized_grammars_parse_identically() {
    let gram = abc_grammar(|w| w.name("A").name("B").name("C"));
    let image = gram.to_binary();
    let revived = taul_core::Grammar::from_binary(&image).unwrap();

    let original = parse_str(&gram, "f", "abc");
    let roundtripped = parse_str(&revived, "f", "abc");
    assert_eq!(playback_events(&original), playback_events(&roundtripped));

    let original = parse_str(&gram, "f", "abx");
    let roundtripped = parse_str(&revived, "f", "abx");
    assert_eq!(playback_events(&original), playback_events(&roundtripped));
}

#[test]
fn text_compiled_grammars_drive_the_same_pipeline() {
    let gram = taul_compiler::load_source(indoc::indoc! {"
        lexer section:
        A : 'a' ;
        B : 'b' ;

        parser section:
        f : (A | B)* end ;
    "})
    .unwrap();
    let tree = parse_str(&gram, "f", "abba");
    assert!(!tree.is_aborted());
    assert_eq!(
        playback_events(&tree),
        vec![
            TraceEvent::Startup,
            syntactic(0, 0),
            lexical(0, 0, 1),
            lexical(1, 1, 1),
            lexical(1, 2, 1),
            lexical(0, 3, 1),
            TraceEvent::Close,
            TraceEvent::Shutdown,
        ]
    );
}
