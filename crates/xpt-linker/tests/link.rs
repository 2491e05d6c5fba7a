//! End-to-end tests: IDL source through the resolver, gather and link.

use xpidl_resolver::Resolver;
use xpt_linker::{gather_descriptors, iid_bytes, link_to_cpp, InterfaceDescriptor, PHF_SIZE};
use xpt_phf::{fnv1a, FNV_OFFSET_BASIS, U32_HIGH_BIT};

fn gather(source: &str) -> Vec<InterfaceDescriptor> {
    let mut resolver = Resolver::new();
    let unit = resolver
        .resolve_source(source, "test.idl")
        .unwrap_or_else(|e| panic!("resolution failed: {e}"));
    gather_descriptors(&unit, resolver.table()).unwrap()
}

fn link(descriptors: Vec<InterfaceDescriptor>) -> String {
    let mut out = Vec::new();
    link_to_cpp(descriptors, &mut out).unwrap();
    String::from_utf8(out).unwrap()
}

const NSIFOO: &str = "
[scriptable, uuid(01234567-89ab-cdef-0123-456789abcdef)]
interface nsIFoo {
  readonly attribute long count;
  void frob(in long x);
};
";

#[test]
fn test_gather_nsifoo() {
    let descriptors = gather(NSIFOO);
    assert_eq!(descriptors.len(), 1);
    let foo = &descriptors[0];
    assert_eq!(foo.name, "nsIFoo");
    assert_eq!(foo.uuid, "01234567-89ab-cdef-0123-456789abcdef");
    assert!(foo.has_flag("scriptable"));
    assert!(foo.parent.is_none());

    // readonly attribute lowers to a single getter, then the method
    assert_eq!(foo.methods.len(), 2);
    let getter = &foo.methods[0];
    assert_eq!(getter.name, "count");
    assert!(getter.has_flag("getter") && getter.has_flag("hasretval"));
    assert_eq!(getter.params.len(), 1);
    assert_eq!(getter.params[0].ty.tag, "TD_INT32");
    assert!(getter.params[0].has_flag("out"));

    let frob = &foo.methods[1];
    assert_eq!(frob.name, "frob");
    assert!(!frob.has_flag("hasretval"));
    assert_eq!(frob.params.len(), 1);
    assert!(frob.params[0].has_flag("in"));
}

#[test]
fn test_writable_attribute_gets_getter_and_setter() {
    let descriptors = gather(
        "
[scriptable, uuid(01234567-89ab-cdef-0123-456789abcdef)]
interface nsIFoo {
  attribute AString name;
};
",
    );
    let methods = &descriptors[0].methods;
    assert_eq!(methods.len(), 2);
    assert!(methods[0].has_flag("getter"));
    assert!(methods[1].has_flag("setter"));
    assert_eq!(methods[0].params[0].ty.tag, "TD_ASTRING");
    assert!(methods[1].params[0].has_flag("in"));
}

#[test]
fn test_nonvoid_return_becomes_trailing_retval() {
    let descriptors = gather(
        "
[scriptable, uuid(01234567-89ab-cdef-0123-456789abcdef)]
interface nsIFoo {
  long add(in long a, in long b);
};
",
    );
    let add = &descriptors[0].methods[0];
    assert!(add.has_flag("hasretval"));
    assert_eq!(add.params.len(), 3);
    let ret = &add.params[2];
    assert!(ret.has_flag("out") && ret.has_flag("retval"));
    assert_eq!(ret.ty.tag, "TD_INT32");
}

#[test]
fn test_hidden_methods_drop_param_info() {
    let descriptors = gather(
        "
%{C++
typedef void* RawThing;
%}
native rawThing(RawThing);
[scriptable, uuid(01234567-89ab-cdef-0123-456789abcdef)]
interface nsIFoo {
  [noscript] void poke(in rawThing thing);
  [notxpcom] long direct();
};
",
    );
    let methods = &descriptors[0].methods;
    // the native param type never needs lowering because the method is hidden
    assert!(methods[0].has_flag("hidden"));
    assert!(methods[0].params.is_empty());
    assert!(methods[1].has_flag("notxpcom"));
    assert!(methods[1].params.is_empty());
    // a notxpcom method still knows it returns a value
    assert!(methods[1].has_flag("hasretval"));
}

#[test]
fn test_size_is_lowered_to_parameter_index() {
    let descriptors = gather(
        "
[scriptable, uuid(01234567-89ab-cdef-0123-456789abcdef)]
interface nsIFoo {
  void fill(in unsigned long aCount, [array, size_is(aCount)] in long aValues);
};
",
    );
    let fill = &descriptors[0].methods[0];
    let arr = &fill.params[1].ty;
    assert_eq!(arr.tag, "TD_ARRAY");
    assert_eq!(arr.size_is, Some(0));
    assert_eq!(arr.element.as_ref().unwrap().tag, "TD_INT32");
}

#[test]
fn test_sized_string_tags() {
    let descriptors = gather(
        "
[scriptable, uuid(01234567-89ab-cdef-0123-456789abcdef)]
interface nsIFoo {
  void take(in unsigned long aLen, [size_is(aLen)] in string aBuf);
};
",
    );
    let ty = &descriptors[0].methods[0].params[1].ty;
    assert_eq!(ty.tag, "TD_PSTRING_SIZE_IS");
    assert_eq!(ty.size_is, Some(0));
}

#[test]
fn test_consts_carry_integer_tags() {
    let descriptors = gather(
        "
[scriptable, uuid(01234567-89ab-cdef-0123-456789abcdef)]
interface nsIFoo {
  const unsigned long FLAG = 1 << 3;
  const short TINY = -2;
};
",
    );
    let consts = &descriptors[0].consts;
    assert_eq!(consts[0].ty.tag, "TD_UINT32");
    assert_eq!(consts[0].value, 8);
    assert_eq!(consts[1].ty.tag, "TD_INT16");
    assert_eq!(consts[1].value, -2);
}

#[test]
fn test_nonscriptable_interfaces_are_skipped() {
    let descriptors = gather(
        "
[uuid(01234567-89ab-cdef-0123-456789abcdef)]
interface nsIInternal {
  void poke();
};
",
    );
    assert!(descriptors.is_empty());
}

#[test]
fn test_link_nsifoo_output() {
    let cpp = link(gather(NSIFOO));

    // interface table entry with the split uuid
    assert!(cpp.contains("XPTConstruct::Mk_nsXPTInterfaceInfo( // 0 = nsIFoo"));
    assert!(cpp.contains(
        "{0x01234567, 0x89ab, 0xcdef, {0x01, 0x23, 0x45, 0x67, 0x89, 0xab, 0xcd, 0xef}}"
    ));

    // method and param tables
    assert!(cpp.contains("// 0 = nsIFoo::count"));
    assert!(cpp.contains("// 1 = nsIFoo::frob"));
    assert!(cpp.contains("/* mTag */ TD_INT32"));

    // string table holds each name once, char by char
    assert!(cpp.contains("'n','s','I','F','o','o','\\0',"));
    assert!(cpp.contains("'c','o','u','n','t','\\0',"));

    // constructor factory struct and the fixed-size assertions
    assert!(cpp.contains("struct XPTConstruct {"));
    assert!(cpp.contains("static constexpr nsXPTInterfaceInfo Mk_nsXPTInterfaceInfo("));
    assert!(cpp.contains("static_assert(kPHFSize == ArrayLength(sPHF_Names)"));
}

#[test]
fn test_linked_interface_is_locatable_by_iid_and_name() {
    let sources = "
[scriptable, uuid(00000000-0000-0000-c000-000000000046)]
interface nsISupports {
};
[scriptable, uuid(01234567-89ab-cdef-0123-456789abcdef)]
interface nsIFoo : nsISupports {
  readonly attribute long count;
  void frob(in long x);
};
";
    let descriptors = gather(sources);

    // Reproduce the runtime's probe against the same tables the output
    // embeds: the IID hash places interfaces, the name hash stores indices.
    let keyed: Vec<(Vec<u8>, InterfaceDescriptor)> = descriptors
        .iter()
        .map(|d| (iid_bytes(&d.uuid).unwrap(), d.clone()))
        .collect();
    let iid_phf = xpt_phf::PerfectHash::new(PHF_SIZE, keyed).unwrap();

    let key = iid_bytes("01234567-89ab-cdef-0123-456789abcdef").unwrap();
    let hit = iid_phf.lookup(&key).unwrap();
    assert_eq!(hit.name, "nsIFoo");

    let inter = iid_phf.intermediate();
    let mid = inter[fnv1a(&key, FNV_OFFSET_BASIS) as usize % inter.len()];
    let slot = if mid & U32_HIGH_BIT != 0 {
        (mid & !U32_HIGH_BIT) as usize
    } else {
        fnv1a(&key, mid) as usize % iid_phf.len()
    };
    assert_eq!(iid_phf.values()[slot].name, "nsIFoo");
}

#[test]
fn test_parent_indices_and_inherited_counts() {
    let sources = "
[scriptable, uuid(00000000-0000-0000-c000-000000000046)]
interface nsISupports {
  void one();
};
[scriptable, uuid(01234567-89ab-cdef-0123-456789abcdef)]
interface nsIFoo : nsISupports {
  void two();
};
";
    let cpp = link(gather(sources));

    // nsIFoo's method count includes the base chain; its parent field is a
    // one-based index into the interface table.
    let foo_entry = cpp
        .split("XPTConstruct::Mk_nsXPTInterfaceInfo")
        .find(|chunk| chunk.contains("= nsIFoo\n"))
        .expect("nsIFoo entry missing");
    assert!(foo_entry.contains("/* mNumMethods */ 2"), "{foo_entry}");
    assert!(!foo_entry.contains("/* mParent */ 0)"), "{foo_entry}");
}

#[test]
fn test_shim_uses_prop_hooks() {
    let descriptors = vec![InterfaceDescriptor {
        name: "nsIDOMThing".into(),
        uuid: "01234567-89ab-cdef-0123-456789abcdef".into(),
        parent: None,
        flags: vec![],
        methods: vec![],
        consts: vec![],
        shim: Some("Thing".into()),
        shimfile: None,
    }];
    let cpp = link(descriptors);

    assert!(cpp.contains("#include \"mozilla/dom/ThingBinding.h\""));
    assert!(cpp.contains("mozilla::dom::ThingBinding::sNativePropertyHooks"));
    // shims are builtinclass and reuse the consts offset as a hook index
    let entry = cpp
        .split("XPTConstruct::Mk_nsXPTInterfaceInfo")
        .find(|chunk| chunk.contains("= nsIDOMThing"))
        .unwrap();
    assert!(entry.contains("/* mIsShim */ 1"), "{entry}");
    assert!(entry.contains("/* mBuiltinClass */ 1"), "{entry}");
}

#[test]
fn test_webidl_type_emits_domobject_table() {
    let cpp = link(gather(
        "
webidl EventTarget;
[scriptable, uuid(01234567-89ab-cdef-0123-456789abcdef)]
interface nsIFoo {
  readonly attribute EventTarget target;
};
",
    ));
    assert!(cpp.contains("#include \"mozilla/dom/EventTarget.h\""));
    assert!(cpp.contains("UnwrapDOMObject<dom::prototypes::id::EventTarget"));
    assert!(cpp.contains("/* mTag */ TD_DOMOBJECT"));
}

#[test]
fn test_base_chain_cycle_is_detected() {
    let mk = |name: &str, uuid: &str, parent: &str| InterfaceDescriptor {
        name: name.into(),
        uuid: uuid.into(),
        parent: Some(parent.into()),
        flags: vec!["scriptable".into()],
        methods: vec![],
        consts: vec![],
        shim: None,
        shimfile: None,
    };
    let descriptors = vec![
        mk("nsIA", "01234567-89ab-cdef-0123-456789abcdef", "nsIB"),
        mk("nsIB", "11234567-89ab-cdef-0123-456789abcdef", "nsIA"),
    ];
    let mut out = Vec::new();
    let err = link_to_cpp(descriptors, &mut out).unwrap_err();
    assert!(
        matches!(err, xpt_linker::LinkError::BaseChainCycle(_)),
        "{err}"
    );
}

#[test]
fn test_descriptors_survive_json_round_trip_into_linker() {
    let descriptors = gather(NSIFOO);
    let json = serde_json::to_string(&descriptors).unwrap();
    let reparsed: Vec<InterfaceDescriptor> = serde_json::from_str(&json).unwrap();
    assert_eq!(descriptors, reparsed);
    let direct = link(descriptors);
    let through_json = link(reparsed);
    assert_eq!(direct, through_json);
}
