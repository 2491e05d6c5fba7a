//! End-to-end parses of realistic IDL files.

use xpidl_parser::ast::{Member, Production};
use xpidl_parser::{parse, ParseError};

const OBSERVER_IDL: &str = r#"
/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. */

#include "nsISupports.idl"

interface nsIRunnable;
webidl Document;

%{C++
class nsCycleCollectionTraversalCallback;
%}

typedef unsigned long long DOMTimeStamp;

[ptr] native RunnablePtr(nsIRunnable *);

/**
 * Observes topic broadcasts.
 */
[scriptable, uuid(db242e01-e4d9-11d2-9dde-000064657374)]
interface nsIObserver : nsISupports
{
    const unsigned long FLAG_WEAK = 1 << 0;
    const unsigned long FLAG_ALL = FLAG_WEAK | 2;

    /**
     * Called when the topic fires.
     */
    void observe(in nsISupports aSubject,
                 in string aTopic,
                 [optional] in wstring aData);

    [noscript] void observeRaw([array, size_is(aCount)] in octet aBytes,
                               in unsigned long aCount);

    readonly attribute DOMTimeStamp lastObserved;
};
"#;

#[test]
fn test_parse_observer_like_file() {
    let idl = parse(OBSERVER_IDL, "nsIObserver.idl").unwrap();
    assert_eq!(idl.deps, vec!["nsIObserver.idl".to_string()]);

    let kinds: Vec<&str> = idl
        .productions
        .iter()
        .map(|p| match p {
            Production::Include(_) => "include",
            Production::Cdata(_) => "cdata",
            Production::Typedef(_) => "typedef",
            Production::Native(_) => "native",
            Production::WebIdl(_) => "webidl",
            Production::Forward(_) => "forward",
            Production::Interface(_) => "interface",
        })
        .collect();
    assert_eq!(
        kinds,
        vec!["include", "forward", "webidl", "cdata", "typedef", "native", "interface"]
    );

    let iface = match idl.productions.last().unwrap() {
        Production::Interface(iface) => iface,
        other => panic!("expected interface, got {other:?}"),
    };
    assert_eq!(iface.name, "nsIObserver");
    assert_eq!(iface.base.as_deref(), Some("nsISupports"));
    assert_eq!(iface.members.len(), 5);
    assert_eq!(
        iface.doc_comments,
        vec!["/**\n * Observes topic broadcasts.\n */".to_string()]
    );

    match &iface.members[3] {
        Member::Method(m) => {
            assert_eq!(m.name, "observeRaw");
            assert_eq!(m.attlist[0].name, "noscript");
            assert_eq!(m.params[0].attlist[1].name, "size_is");
            assert_eq!(m.params[0].attlist[1].value.as_deref(), Some("aCount"));
        }
        other => panic!("expected method, got {other:?}"),
    }
}

#[test]
fn test_first_error_aborts() {
    let err = parse("interface nsIFoo {\n  void broken(;\n};", "broken.idl").unwrap_err();
    match err {
        ParseError::Syntax { message, location } => {
            assert_eq!(location.line(), 2);
            assert!(message.contains("direction"), "{message}");
        }
        other => panic!("expected syntax error, got {other:?}"),
    }
}

#[test]
fn test_locations_track_lines() {
    let idl = parse("\n\ntypedef long A;\ntypedef long B;\n", "loc.idl").unwrap();
    match (&idl.productions[0], &idl.productions[1]) {
        (Production::Typedef(a), Production::Typedef(b)) => {
            assert_eq!(a.location.line(), 3);
            assert_eq!(b.location.line(), 4);
            assert_eq!(a.location.to_string(), "loc.idl line 3:1");
        }
        other => panic!("expected typedefs, got {other:?}"),
    }
}
