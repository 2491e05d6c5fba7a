//! End-to-end resolution tests over real IDL snippets.

use xpidl_resolver::{
    Member, ResolveError, ResolvedProduction, Resolver, TypeNode, WebIdlConfig, WebIdlEntry,
};

fn resolve(source: &str) -> (Resolver, Vec<ResolvedProduction>) {
    let mut resolver = Resolver::new();
    let unit = resolver
        .resolve_source(source, "test.idl")
        .unwrap_or_else(|e| panic!("resolution failed: {e}"));
    (resolver, unit.productions)
}

fn resolve_err(source: &str) -> ResolveError {
    let mut resolver = Resolver::new();
    resolver
        .resolve_source(source, "test.idl")
        .err()
        .expect("resolution should have failed")
}

fn first_interface(
    resolver: &Resolver,
    productions: &[ResolvedProduction],
) -> xpidl_resolver::Interface {
    productions
        .iter()
        .find_map(|p| match p {
            ResolvedProduction::Interface(r) => resolver.table().interface(*r).cloned(),
            _ => None,
        })
        .expect("no interface resolved")
}

const SUPPORTS: &str = r#"
[scriptable, uuid(00000000-0000-0000-c000-000000000046)]
interface nsISupports {
};
"#;

#[test]
fn test_basic_interface() {
    let src = format!(
        "{SUPPORTS}
[scriptable, uuid(a6cf90c1-15b3-11d2-932e-00805f8add32)]
interface nsIThing : nsISupports {{
  const unsigned long FLAG_WEAK = 1 << 0;
  const unsigned long FLAG_ALL = FLAG_WEAK | 2;
  readonly attribute long count;
  void frob(in long x, out AString result);
}};
"
    );
    let (resolver, productions) = resolve(&src);
    let iface = first_interface(&resolver, &productions[1..]);
    assert_eq!(iface.name, "nsIThing");
    assert_eq!(iface.base_name.as_deref(), Some("nsISupports"));
    assert_eq!(iface.attributes.uuid, "a6cf90c1-15b3-11d2-932e-00805f8add32");

    let consts: Vec<i64> = iface.consts().map(|c| c.value()).collect();
    assert_eq!(consts, vec![1, 3]);

    // one slot for the readonly attribute, one for the method
    assert_eq!(iface.count_local_entries(), 2);
}

#[test]
fn test_forward_then_definition() {
    let src = format!(
        "interface nsIObserver;
{SUPPORTS}
[scriptable, uuid(db242e01-e4d9-11d2-9dde-000064657374)]
interface nsIObserver : nsISupports {{
  void observe(in nsIObserver aSubject);
}};
"
    );
    let (resolver, productions) = resolve(&src);
    let iface = first_interface(&resolver, &productions);
    assert_eq!(iface.name, "nsIObserver");
    // the parameter resolved to the interface itself, not the forward decl
    let method = iface.methods().next().unwrap();
    let param_node = resolver.table().get(method.params[0].ty);
    assert!(matches!(param_node, TypeNode::Interface(i) if i.name == "nsIObserver"));
}

#[test]
fn test_underscore_names_are_folded() {
    let src = "
[scriptable, uuid(db242e01-e4d9-11d2-9dde-000064657374)]
interface _Underscore {
  void _func();
};
";
    let (resolver, productions) = resolve(src);
    let iface = first_interface(&resolver, &productions);
    assert_eq!(iface.name, "Underscore");
    assert_eq!(iface.methods().next().unwrap().name, "func");
}

#[test]
fn test_base_must_be_an_interface() {
    let src = "
typedef long Thing;
[scriptable, uuid(db242e01-e4d9-11d2-9dde-000064657374)]
interface nsIFoo : Thing {
};
";
    let err = resolve_err(src);
    assert!(matches!(err, ResolveError::Type { .. }), "{err}");
    assert!(err.to_string().contains("non-interface"), "{err}");
}

#[test]
fn test_scriptable_from_nonscriptable_warns() {
    let src = "
[uuid(00000000-0000-0000-c000-000000000046)]
interface nsIPlain {
};
[scriptable, uuid(db242e01-e4d9-11d2-9dde-000064657374)]
interface nsIDerived : nsIPlain {
};
";
    let (resolver, _) = resolve(src);
    let warnings = resolver.warnings();
    assert_eq!(warnings.len(), 1);
    assert!(
        warnings[0].message.contains("derives from non-scriptable"),
        "{}",
        warnings[0]
    );
}

#[test]
fn test_builtinclass_base_requires_builtinclass() {
    let src = "
[scriptable, builtinclass, uuid(00000000-0000-0000-c000-000000000046)]
interface nsIBuiltin {
};
[scriptable, uuid(db242e01-e4d9-11d2-9dde-000064657374)]
interface nsIDerived : nsIBuiltin {
};
";
    let err = resolve_err(src);
    assert!(err.to_string().contains("builtinclass"), "{err}");

    let src_ok = "
[scriptable, builtinclass, uuid(00000000-0000-0000-c000-000000000046)]
interface nsIBuiltin {
};
[scriptable, builtinclass, uuid(db242e01-e4d9-11d2-9dde-000064657374)]
interface nsIDerived : nsIBuiltin {
};
";
    resolve(src_ok);
}

#[test]
fn test_const_requires_short_or_long() {
    let src = "
[scriptable, uuid(db242e01-e4d9-11d2-9dde-000064657374)]
interface nsIFoo {
  const string NAME = 1;
};
";
    let err = resolve_err(src);
    assert!(
        err.to_string().contains("const may only be a short or long type"),
        "{err}"
    );
}

#[test]
fn test_const_chain_across_base() {
    let src = "
[scriptable, uuid(00000000-0000-0000-c000-000000000046)]
interface nsIBase {
  const long BASE = 4;
};
[scriptable, uuid(db242e01-e4d9-11d2-9dde-000064657374)]
interface nsIDerived : nsIBase {
  const long DERIVED = BASE * 2 + LOCAL;
  const long LOCAL = 1;
};
";
    let (resolver, productions) = resolve(src);
    let iface = first_interface(&resolver, &productions[1..]);
    assert_eq!(iface.find_const("DERIVED").unwrap().value(), 9);
}

#[test]
fn test_const_cycle_is_an_error() {
    let src = "
[scriptable, uuid(db242e01-e4d9-11d2-9dde-000064657374)]
interface nsIFoo {
  const long A = B;
  const long B = A;
};
";
    let err = resolve_err(src);
    assert!(err.to_string().contains("in terms of itself"), "{err}");
}

#[test]
fn test_duplicate_member_names() {
    let src = "
[scriptable, uuid(db242e01-e4d9-11d2-9dde-000064657374)]
interface nsIFoo {
  void frob();
  readonly attribute long frob;
};
";
    let err = resolve_err(src);
    assert!(err.to_string().contains("specified twice"), "{err}");
}

#[test]
fn test_retval_must_be_last() {
    let src = "
[scriptable, uuid(db242e01-e4d9-11d2-9dde-000064657374)]
interface nsIFoo {
  void frob([retval] out long result, in long x);
};
";
    let err = resolve_err(src);
    assert!(err.to_string().contains("not the last parameter"), "{err}");
}

#[test]
fn test_size_is_sibling_checks() {
    let missing = "
[scriptable, uuid(db242e01-e4d9-11d2-9dde-000064657374)]
interface nsIFoo {
  void frob([array, size_is(aCount)] in long aValues);
};
";
    let err = resolve_err(missing);
    assert!(
        err.to_string().contains("could not find size_is parameter"),
        "{err}"
    );

    let wrong_type = "
[scriptable, uuid(db242e01-e4d9-11d2-9dde-000064657374)]
interface nsIFoo {
  void frob(in long aCount, [array, size_is(aCount)] in long aValues);
};
";
    let err = resolve_err(wrong_type);
    assert!(
        err.to_string().contains("must have type 'unsigned long'"),
        "{err}"
    );

    let ok = "
[scriptable, uuid(db242e01-e4d9-11d2-9dde-000064657374)]
interface nsIFoo {
  void frob(in unsigned long aCount, [array, size_is(aCount)] in long aValues);
};
";
    resolve(ok);
}

#[test]
fn test_array_element_restrictions() {
    let src = "
[scriptable, uuid(db242e01-e4d9-11d2-9dde-000064657374)]
interface nsIFoo {
  void frob(in unsigned long aCount, [array, size_is(aCount)] in AString aValues);
};
";
    let err = resolve_err(src);
    assert!(
        err.to_string().contains("unsupported [array] element type"),
        "{err}"
    );
}

#[test]
fn test_infallible_requires_builtinclass() {
    let src = "
[scriptable, uuid(db242e01-e4d9-11d2-9dde-000064657374)]
interface nsIFoo {
  [infallible] readonly attribute long count;
};
";
    let err = resolve_err(src);
    assert!(
        err.to_string().contains("only allowed on [builtinclass]"),
        "{err}"
    );

    let ok = "
[scriptable, builtinclass, uuid(db242e01-e4d9-11d2-9dde-000064657374)]
interface nsIFoo {
  [infallible] readonly attribute long count;
};
";
    let (resolver, productions) = resolve(ok);
    let iface = first_interface(&resolver, &productions);
    match &iface.members[0] {
        Member::Attribute(a) => assert!(a.infallible),
        other => panic!("expected attribute, got {other:?}"),
    }
}

#[test]
fn test_null_sentinel_requires_domstring_setter() {
    let readonly = "
[scriptable, uuid(db242e01-e4d9-11d2-9dde-000064657374)]
interface nsIFoo {
  [Null(Empty)] readonly attribute DOMString name;
};
";
    let err = resolve_err(readonly);
    assert!(err.to_string().contains("only makes sense for setters"), "{err}");

    let wrong_type = "
[scriptable, uuid(db242e01-e4d9-11d2-9dde-000064657374)]
interface nsIFoo {
  [Null(Empty)] attribute long name;
};
";
    let err = resolve_err(wrong_type);
    assert!(err.to_string().contains("can only be used on DOMString"), "{err}");

    let ok = "
[scriptable, uuid(db242e01-e4d9-11d2-9dde-000064657374)]
interface nsIFoo {
  [Null(Stringify), Undefined(Empty)] attribute DOMString name;
};
";
    resolve(ok);
}

#[test]
fn test_function_interface_single_method() {
    let src = "
[scriptable, function, uuid(db242e01-e4d9-11d2-9dde-000064657374)]
interface nsIRunnable {
  void run();
  void cancel();
};
";
    let err = resolve_err(src);
    assert!(err.to_string().contains("marked 'function'"), "{err}");
}

#[test]
fn test_notxpcom_forces_builtinclass() {
    let src = "
[scriptable, uuid(db242e01-e4d9-11d2-9dde-000064657374)]
interface nsIFoo {
  [notxpcom] long directCall();
};
";
    let (resolver, productions) = resolve(src);
    let iface = first_interface(&resolver, &productions);
    assert!(iface.implicit_builtinclass);
}

#[test]
fn test_vtable_size_limit() {
    let mut body = String::new();
    for i in 0..251 {
        body.push_str(&format!("  void method{i}();\n"));
    }
    let src = format!(
        "[scriptable, uuid(db242e01-e4d9-11d2-9dde-000064657374)]
interface nsIWide {{
{body}}};
"
    );
    let err = resolve_err(&src);
    assert!(err.to_string().contains("too many entries"), "{err}");

    // builtinclass interfaces bypass the stub limit
    let src = format!(
        "[scriptable, builtinclass, uuid(db242e01-e4d9-11d2-9dde-000064657374)]
interface nsIWide {{
{body}}};
"
    );
    resolve(&src);

    let mut body = String::new();
    for i in 0..250 {
        body.push_str(&format!("  void method{i}();\n"));
    }
    let src = format!(
        "[scriptable, uuid(db242e01-e4d9-11d2-9dde-000064657374)]
interface nsIExactlyAtLimit {{
{body}}};
"
    );
    resolve(&src);
}

#[test]
fn test_tarray_resolution() {
    let src = "
[scriptable, uuid(db242e01-e4d9-11d2-9dde-000064657374)]
interface nsIFoo {
  void setValues(in TArray<unsigned long> aValues);
};
";
    let (resolver, productions) = resolve(src);
    let iface = first_interface(&resolver, &productions);
    let method = iface.methods().next().unwrap();
    assert_eq!(
        resolver
            .table()
            .native_type(
                method.params[0].ty,
                xpidl_resolver::CallType::In,
                false
            )
            .unwrap(),
        "const nsTArray<uint32_t>&"
    );
}

#[test]
fn test_webidl_resolution() {
    let mut resolver = Resolver::new();
    let mut config = WebIdlConfig::new();
    config.insert(
        "EventTarget",
        WebIdlEntry {
            native_type: Some("mozilla::dom::EventTarget".into()),
            header_file: None,
        },
    );
    resolver.set_webidl_config(config);

    let unit = resolver
        .resolve_source(
            "webidl EventTarget;
[scriptable, uuid(db242e01-e4d9-11d2-9dde-000064657374)]
interface nsIFoo {
  readonly attribute EventTarget target;
};
",
            "test.idl",
        )
        .unwrap();
    let r = match &unit.productions[0] {
        ResolvedProduction::WebIdl(r) => *r,
        other => panic!("expected webidl production, got {other:?}"),
    };
    match resolver.table().get(r) {
        TypeNode::WebIdl { native, header_file, .. } => {
            assert_eq!(native, "mozilla::dom::EventTarget");
            assert_eq!(header_file, "mozilla/dom/EventTarget.h");
        }
        other => panic!("expected webidl node, got {other:?}"),
    }
}

#[test]
fn test_includes_resolve_and_dedup() {
    let dir = std::env::temp_dir().join(format!("xpidl-resolve-test-{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    std::fs::write(
        dir.join("nsISupports.idl"),
        "[scriptable, uuid(00000000-0000-0000-c000-000000000046)]
interface nsISupports {
};
",
    )
    .unwrap();
    std::fs::write(
        dir.join("nsIObserver.idl"),
        "#include \"nsISupports.idl\"
[scriptable, uuid(db242e01-e4d9-11d2-9dde-000064657374)]
interface nsIObserver : nsISupports {
  void observe(in nsISupports aSubject);
};
",
    )
    .unwrap();

    let mut resolver = Resolver::new();
    resolver.add_include_dir(&dir);

    // diamond: both includes pull in nsISupports
    let unit = resolver
        .resolve_source(
            "#include \"nsISupports.idl\"
#include \"nsIObserver.idl\"
[scriptable, uuid(a6cf90c1-15b3-11d2-932e-00805f8add32)]
interface nsIThing : nsIObserver {
};
",
            "nsIThing.idl",
        )
        .unwrap();

    assert!(unit.names.contains("nsISupports"));
    assert!(unit.names.contains("nsIObserver"));
    assert!(unit.deps.iter().any(|d| d.ends_with("nsISupports.idl")));
    assert!(unit.deps.iter().any(|d| d.ends_with("nsIObserver.idl")));

    let missing = resolver
        .resolve_source("#include \"nsIMissing.idl\"\n", "broken.idl")
        .unwrap_err();
    assert!(matches!(missing, ResolveError::FileNotFound { .. }), "{missing}");

    std::fs::remove_dir_all(&dir).ok();
}

#[test]
fn test_interface_entry_count_includes_base() {
    let src = "
[scriptable, uuid(00000000-0000-0000-c000-000000000046)]
interface nsIBase {
  void one();
  attribute long two;
};
[scriptable, uuid(db242e01-e4d9-11d2-9dde-000064657374)]
interface nsIDerived : nsIBase {
  void four();
};
";
    let (resolver, productions) = resolve(src);
    let derived = productions
        .iter()
        .filter_map(|p| match p {
            ResolvedProduction::Interface(r) => Some(*r),
            _ => None,
        })
        .nth(1)
        .unwrap();
    assert_eq!(resolver.table().count_entries(derived), 4);
}
