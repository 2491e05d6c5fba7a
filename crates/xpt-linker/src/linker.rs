//! Linking descriptors into a single C++ source unit.
//!
//! The output file holds every interface the runtime knows about: flat
//! tables of interfaces, methods, params, types and constants, one shared
//! string array, and two perfect hashes (IID to interface, name to
//! interface index) with a fixed intermediate size so the runtime's modulo
//! compiles to a mask.

use std::io::Write;
use std::path::Path;

use rustc_hash::FxHashMap;
use xpt_phf::PerfectHash;

use crate::codegen::{ConstructorSet, Instance};
use crate::descriptor::{
    ConstDescriptor, InterfaceDescriptor, MethodDescriptor, ParamDescriptor, TypeDescriptor,
};
use crate::error::LinkError;
use crate::strings::StringTable;

/// Number of entries in each perfect hash's intermediate table. Keeping it
/// a constant power of two lets the runtime reduce hashes with a mask.
pub const PHF_SIZE: usize = 256;

/// Split a canonical IID string into its 11 hex groups.
fn split_iid(iid: &str) -> Result<[String; 11], LinkError> {
    let hex: String = iid.chars().filter(|c| *c != '-').collect();
    if hex.len() != 32 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(LinkError::InvalidIid(iid.to_owned()));
    }
    const LENGTHS: [usize; 11] = [8, 4, 4, 2, 2, 2, 2, 2, 2, 2, 2];
    let mut groups: [String; 11] = Default::default();
    let mut idx = 0;
    for (group, len) in groups.iter_mut().zip(LENGTHS) {
        *group = hex[idx..idx + len].to_owned();
        idx += len;
    }
    Ok(groups)
}

/// The byte representation of an IID used as a hash key: each group in
/// little-endian order.
pub fn iid_bytes(iid: &str) -> Result<Vec<u8>, LinkError> {
    let mut bytes = Vec::with_capacity(16);
    for group in split_iid(iid)? {
        let mut group_bytes: Vec<u8> = (0..group.len())
            .step_by(2)
            .map(|i| u8::from_str_radix(&group[i..i + 2], 16))
            .collect::<Result<_, _>>()
            .map_err(|_| LinkError::InvalidIid(iid.to_owned()))?;
        group_bytes.reverse();
        bytes.extend(group_bytes);
    }
    Ok(bytes)
}

fn lower_uuid(uuid: &str) -> Result<String, LinkError> {
    let g = split_iid(uuid)?;
    Ok(format!(
        "{{0x{}, 0x{}, 0x{}, {{0x{}, 0x{}, 0x{}, 0x{}, 0x{}, 0x{}, 0x{}, 0x{}}}}}",
        g[0], g[1], g[2], g[3], g[4], g[5], g[6], g[7], g[8], g[9], g[10]
    ))
}

/// Documentation comment for a lowered type.
fn describe_type(ty: &TypeDescriptor) -> String {
    let tag = ty.tag.strip_prefix("TD_").unwrap_or(&ty.tag).to_lowercase();
    if tag == "array" || tag == "tarray" {
        let element = ty
            .element
            .as_deref()
            .map(describe_type)
            .unwrap_or_default();
        return match ty.size_is {
            Some(size_is) => format!("{element}[size_is={size_is}]"),
            None => format!("{element}[]"),
        };
    }
    if tag == "interface_type" {
        return ty.name.clone().unwrap_or_default();
    }
    if tag == "interface_is_type" {
        return format!("iid_is({})", ty.iid_is.unwrap_or_default());
    }
    if tag.ends_with("_size_is") {
        return format!("{tag}(size_is={})", ty.size_is.unwrap_or_default());
    }
    tag
}

struct Linker {
    ordered: PerfectHash<InterfaceDescriptor>,
    name_phf: PerfectHash<u16>,
    ctors: ConstructorSet,
    includes: Vec<String>,
    types: Vec<Instance>,
    type_keys: Vec<String>,
    ifaces: Vec<Instance>,
    params: Vec<Instance>,
    methods: Vec<Instance>,
    consts: Vec<Instance>,
    prophooks: Vec<String>,
    domobjects: Vec<Instance>,
    domobject_idx: FxHashMap<String, usize>,
    strings: StringTable,
}

impl Linker {
    fn new(interfaces: Vec<InterfaceDescriptor>) -> Result<Self, LinkError> {
        let keyed: Vec<(Vec<u8>, InterfaceDescriptor)> = interfaces
            .into_iter()
            .map(|iface| Ok((iid_bytes(&iface.uuid)?, iface)))
            .collect::<Result<_, LinkError>>()?;
        let ordered = PerfectHash::new(PHF_SIZE, keyed)?;

        let name_keyed: Vec<(Vec<u8>, u16)> = ordered
            .values()
            .iter()
            .enumerate()
            .map(|(idx, iface)| (iface.name.clone().into_bytes(), idx as u16))
            .collect();
        let name_phf = PerfectHash::new(PHF_SIZE, name_keyed)?;

        Ok(Linker {
            ordered,
            name_phf,
            ctors: ConstructorSet::new(),
            includes: Vec::new(),
            types: Vec::new(),
            type_keys: Vec::new(),
            ifaces: Vec::new(),
            params: Vec::new(),
            methods: Vec::new(),
            consts: Vec::new(),
            prophooks: Vec::new(),
            domobjects: Vec::new(),
            domobject_idx: FxHashMap::default(),
            strings: StringTable::new(),
        })
    }

    /// One-based index of an interface by name; 0 is the null sentinel.
    fn interface_idx(&self, name: Option<&str>) -> u16 {
        if let Some(name) = name {
            if let Some(&idx) = self.name_phf.lookup(name.as_bytes()) {
                // The hash tolerates unknown keys, so verify the hit.
                if self.ordered.values()[idx as usize].name == name {
                    return idx + 1;
                }
            }
        }
        0
    }

    fn lower_domobject(&mut self, ty: &TypeDescriptor, owner: &str) -> Result<usize, LinkError> {
        let name = ty
            .name
            .clone()
            .ok_or_else(|| LinkError::malformed(owner, "DOM object without a name"))?;
        if let Some(&idx) = self.domobject_idx.get(&name) {
            return Ok(idx);
        }
        let native = ty
            .native
            .clone()
            .ok_or_else(|| LinkError::malformed(owner, "DOM object without a native type"))?;
        let header = ty
            .header_file
            .clone()
            .ok_or_else(|| LinkError::malformed(owner, "DOM object without a header"))?;
        self.includes.push(header);

        let idx = self.domobjects.len();
        let instance = self.ctors.instance(
            "nsXPTDOMObjectInfo",
            format!("{idx} = {name}"),
            vec![
                (
                    "mUnwrap",
                    format!("UnwrapDOMObject<dom::prototypes::id::{name}, {native}>").into(),
                ),
                ("mWrap", format!("WrapDOMObject<{native}>").into()),
                ("mCleanup", format!("CleanupDOMObject<{native}>").into()),
            ],
        );
        self.domobjects.push(instance);
        self.domobject_idx.insert(name, idx);
        Ok(idx)
    }

    fn lower_type(&mut self, ty: &TypeDescriptor, owner: &str) -> Result<Instance, LinkError> {
        let mut d1 = 0usize;
        let mut d2 = 0usize;

        match ty.tag.as_str() {
            "TD_ARRAY" => {
                d1 = ty.size_is.ok_or_else(|| {
                    LinkError::malformed(owner, "TD_ARRAY without size_is")
                })? as usize;
                let element = ty.element.as_deref().ok_or_else(|| {
                    LinkError::malformed(owner, "TD_ARRAY without an element type")
                })?;
                d2 = self.extra_type(element, owner)?;
            }
            "TD_TARRAY" => {
                let element = ty.element.as_deref().ok_or_else(|| {
                    LinkError::malformed(owner, "TD_TARRAY without an element type")
                })?;
                d1 = self.extra_type(element, owner)?;
            }
            "TD_INTERFACE_TYPE" => {
                let idx = self.interface_idx(ty.name.as_deref()) as usize;
                d1 = idx >> 8;
                d2 = idx & 0xff;
            }
            "TD_INTERFACE_IS_TYPE" => {
                d1 = ty.iid_is.ok_or_else(|| {
                    LinkError::malformed(owner, "TD_INTERFACE_IS_TYPE without iid_is")
                })? as usize;
            }
            "TD_DOMOBJECT" => {
                let idx = self.lower_domobject(ty, owner)?;
                d1 = idx >> 8;
                d2 = idx & 0xff;
            }
            tag if tag.ends_with("_SIZE_IS") => {
                d1 = ty.size_is.ok_or_else(|| {
                    LinkError::malformed(owner, "sized type without size_is")
                })? as usize;
            }
            _ => {}
        }

        if d1 >= 256 || d2 >= 256 {
            return Err(LinkError::malformed(owner, "type data values too large"));
        }
        Ok(self.ctors.instance(
            "nsXPTType",
            describe_type(ty),
            vec![
                ("mTag", ty.tag.clone().into()),
                ("mData1", d1.into()),
                ("mData2", d2.into()),
            ],
        ))
    }

    /// Index of an element type in the shared extra-types table.
    fn extra_type(&mut self, ty: &TypeDescriptor, owner: &str) -> Result<usize, LinkError> {
        let instance = self.lower_type(ty, owner)?;
        let key = instance.to_string();
        if let Some(idx) = self.type_keys.iter().position(|k| *k == key) {
            return Ok(idx);
        }
        self.types.push(instance);
        self.type_keys.push(key);
        Ok(self.types.len() - 1)
    }

    fn lower_param(
        &mut self,
        param: &ParamDescriptor,
        name: &str,
        owner: &str,
    ) -> Result<(), LinkError> {
        let ty = self.lower_type(&param.ty, owner)?;
        let instance = self.ctors.instance(
            "nsXPTParamInfo",
            format!("{} = {name}", self.params.len()),
            vec![
                ("mType", ty.into()),
                ("mType.mInParam", param.has_flag("in").into()),
                ("mType.mOutParam", param.has_flag("out").into()),
                ("mType.mOptionalParam", param.has_flag("optional").into()),
            ],
        );
        self.params.push(instance);
        Ok(())
    }

    fn lower_method(&mut self, method: &MethodDescriptor, ifacename: &str) -> Result<(), LinkError> {
        let hideparams = method.has_flag("notxpcom") || method.has_flag("hidden");
        let methodname = format!("{ifacename}::{}", method.name);

        // Hidden methods keep their slot but carry no param info.
        let (params_off, num_params) = if hideparams {
            (0, 0)
        } else {
            (self.params.len(), method.params.len())
        };
        let name_off = self.strings.intern(&method.name);
        let instance = self.ctors.instance(
            "nsXPTMethodInfo",
            format!("{} = {methodname}", self.methods.len()),
            vec![
                ("mName", name_off.into()),
                ("mParams", params_off.into()),
                ("mNumParams", num_params.into()),
                ("mGetter", method.has_flag("getter").into()),
                ("mSetter", method.has_flag("setter").into()),
                ("mNotXPCOM", method.has_flag("notxpcom").into()),
                ("mHidden", method.has_flag("hidden").into()),
                ("mOptArgc", method.has_flag("optargc").into()),
                ("mContext", method.has_flag("jscontext").into()),
                ("mHasRetval", method.has_flag("hasretval").into()),
            ],
        );
        self.methods.push(instance);

        if !hideparams {
            for (idx, param) in method.params.iter().enumerate() {
                self.lower_param(param, &format!("{methodname}[{idx}]"), ifacename)?;
            }
        }
        Ok(())
    }

    fn lower_const(&mut self, konst: &ConstDescriptor, ifacename: &str) -> Result<(), LinkError> {
        // Constants are 16- or 32-bit integers only; the table stores a
        // 32-bit payload plus a signedness bit instead of a full type.
        let is_signed = match konst.ty.tag.as_str() {
            "TD_INT16" | "TD_INT32" => true,
            "TD_UINT16" | "TD_UINT32" => false,
            other => {
                return Err(LinkError::malformed(
                    ifacename,
                    format!("constant '{}' has non-integer tag {other}", konst.name),
                ));
            }
        };
        let name_off = self.strings.intern(&konst.name);
        let instance = self.ctors.instance(
            "ConstInfo",
            format!("{} = {ifacename}::{}", self.consts.len(), konst.name),
            vec![
                ("mName", name_off.into()),
                ("mSigned", is_signed.into()),
                ("mValue", format!("(uint32_t){}", konst.value).into()),
            ],
        );
        self.consts.push(instance);
        Ok(())
    }

    fn lower_prop_hooks(&mut self, iface: &InterfaceDescriptor) {
        let shim = iface.shim.as_deref().unwrap_or_default();
        let binding = iface.shimfile.as_deref().unwrap_or(shim);
        self.includes
            .push(format!("mozilla/dom/{binding}Binding.h"));
        self.prophooks.push(format!(
            "mozilla::dom::{shim}Binding::sNativePropertyHooks, // {} = {}({shim})",
            self.prophooks.len(),
            iface.name
        ));
    }

    /// Total method/const counts and effective builtinclass flag across the
    /// parent chain.
    fn collect_base_info(
        &self,
        iface: &InterfaceDescriptor,
    ) -> Result<(usize, usize, bool), LinkError> {
        let mut methods = 0;
        let mut consts = 0;
        let mut builtinclass = false;
        let mut cursor = iface;
        let mut steps = 0;
        loop {
            methods += cursor.methods.len();
            consts += cursor.consts.len();
            builtinclass = builtinclass || cursor.has_flag("builtinclass");
            let idx = self.interface_idx(cursor.parent.as_deref());
            if idx == 0 {
                break;
            }
            cursor = &self.ordered.values()[idx as usize - 1];
            steps += 1;
            if steps > self.ordered.len() {
                return Err(LinkError::BaseChainCycle(iface.name.clone()));
            }
        }
        Ok((methods, consts, builtinclass))
    }

    fn lower_iface(&mut self, idx: usize) -> Result<(), LinkError> {
        let iface = self.ordered.values()[idx].clone();
        let is_shim = iface.shim.is_some();

        let method_off = self.methods.len();
        let mut consts_off = self.consts.len();
        let mut method_cnt = 0;
        let mut const_cnt = 0;
        let builtinclass;
        if is_shim {
            // A shim's methods and constants live in its WebIDL binding;
            // the constants offset field holds the prop-hooks index instead.
            consts_off = self.prophooks.len();
            builtinclass = true;
        } else {
            let (m, c, b) = self.collect_base_info(&iface)?;
            method_cnt = m;
            const_cnt = c;
            builtinclass = b;
        }

        let iid = lower_uuid(&iface.uuid)?;
        let name_off = self.strings.intern(&iface.name);
        let parent = self.interface_idx(iface.parent.as_deref()) as usize;
        let instance = self.ctors.instance(
            "nsXPTInterfaceInfo",
            format!("{} = {}", self.ifaces.len(), iface.name),
            vec![
                ("mIID", iid.into()),
                ("mName", name_off.into()),
                ("mParent", parent.into()),
                ("mMethods", method_off.into()),
                ("mNumMethods", method_cnt.into()),
                ("mConsts", consts_off.into()),
                ("mNumConsts", const_cnt.into()),
                ("mIsShim", is_shim.into()),
                ("mBuiltinClass", builtinclass.into()),
                (
                    "mMainProcessScriptableOnly",
                    iface.has_flag("main_process_only").into(),
                ),
                ("mFunction", iface.has_flag("function").into()),
            ],
        );
        self.ifaces.push(instance);

        if is_shim {
            self.lower_prop_hooks(&iface);
            return Ok(());
        }
        for method in &iface.methods {
            self.lower_method(method, &iface.name)?;
        }
        for konst in &iface.consts {
            self.lower_const(konst, &iface.name)?;
        }
        Ok(())
    }
}

/// Link `interfaces` and write the C++ source unit to `out`.
pub fn link_to_cpp<W: Write>(
    interfaces: Vec<InterfaceDescriptor>,
    out: &mut W,
) -> Result<(), LinkError> {
    let mut linker = Linker::new(interfaces)?;

    // Interfaces are lowered in the IID hash's placement order so the IID
    // lookup lands directly on its table entry.
    for idx in 0..linker.ordered.len() {
        linker.lower_iface(idx)?;
    }

    writeln!(out, "/* THIS FILE WAS GENERATED - DO NOT EDIT */\n")?;

    for include in &linker.includes {
        writeln!(out, "#include \"{include}\"")?;
    }

    out.write_all(
        br#"
#include "xptinfo.h"
#include "mozilla/TypeTraits.h"
#include "mozilla/dom/BindingUtils.h"

using namespace mozilla; // For mozilla::ArrayLength and mozilla::DeclVal.

// This macro resolves to the type of the non-static data member `m` of `T`.
// It's used by generated data type constructors.
#define MTYPE(T, m) decltype(DeclVal<T>().m)

// These template methods are specialized to be used in the sDOMObjects table.
template<dom::prototypes::ID PrototypeID, typename T>
static nsresult UnwrapDOMObject(JS::HandleValue aHandle, void** aObj)
{
  RefPtr<T> p;
  nsresult rv = dom::UnwrapObject<PrototypeID, T>(aHandle, p);
  p.forget(aObj);
  return rv;
}

template<typename T>
static bool WrapDOMObject(JSContext* aCx, void* aObj, JS::MutableHandleValue aHandle)
{
  return dom::GetOrCreateDOMReflector(aCx, reinterpret_cast<T*>(aObj), aHandle);
}

template<typename T>
static void CleanupDOMObject(void* aObj)
{
  RefPtr<T> p = already_AddRefed<T>(reinterpret_cast<T*>(aObj));
}

namespace xpt {
namespace detail {

"#,
    )?;

    // Factory methods live on one struct so they can be `friend class` of
    // the data structures and initialize private fields.
    write!(out, "struct XPTConstruct {{{}", linker.ctors.decls())?;
    out.write_all(b"\n};\n\n")?;

    write_array(out, "nsXPTInterfaceInfo", "sInterfaces", &linker.ifaces)?;
    write_array(out, "nsXPTType", "sTypes", &linker.types)?;
    write_array(out, "nsXPTParamInfo", "sParams", &linker.params)?;
    write_array(out, "nsXPTMethodInfo", "sMethods", &linker.methods)?;
    write_array(out, "nsXPTDOMObjectInfo", "sDOMObjects", &linker.domobjects)?;
    write_array(out, "ConstInfo", "sConsts", &linker.consts)?;
    write_plain_array(
        out,
        "mozilla::dom::NativePropertyHooks*",
        "sPropHooks",
        &linker.prophooks,
    )?;

    // Individual characters avoid compiler string-literal length limits.
    writeln!(out, "const char sStrings[] = {{")?;
    for (s, off) in linker.strings.iter() {
        let chars: Vec<String> = s.chars().map(|c| c.to_string()).collect();
        writeln!(out, "  // {off} = {s}\n  '{}','\\0',", chars.join("','"))?;
    }
    writeln!(out, "}};\n")?;

    write_phf_array(out, "sPHF_IIDs", "uint32_t", linker.ordered.intermediate())?;
    write_phf_array(out, "sPHF_Names", "uint32_t", linker.name_phf.intermediate())?;
    let name_idxs: Vec<u32> = linker.name_phf.values().iter().map(|&v| v as u32).collect();
    write_phf_array(out, "sPHF_NamesIdxs", "uint16_t", &name_idxs)?;

    out.write_all(
        br#"const uint16_t sInterfacesSize = ArrayLength(sInterfaces);
static_assert(sInterfacesSize == ArrayLength(sPHF_NamesIdxs),
              "sPHF_NamesIdxs must have same size as sInterfaces");

static_assert(kPHFSize == ArrayLength(sPHF_Names),
              "sPHF_IIDs must have size kPHFSize");
static_assert(kPHFSize == ArrayLength(sPHF_IIDs),
              "sPHF_Names must have size kPHFSize");

} // namespace detail
} // namespace xpt
"#,
    )?;
    Ok(())
}

/// Merge descriptor lists from JSON files and link them.
pub fn link_files<W: Write, P: AsRef<Path>>(paths: &[P], out: &mut W) -> Result<(), LinkError> {
    let mut interfaces = Vec::new();
    for path in paths {
        let text = std::fs::read_to_string(path)?;
        let mut batch: Vec<InterfaceDescriptor> = serde_json::from_str(&text)?;
        interfaces.append(&mut batch);
    }
    link_to_cpp(interfaces, out)
}

fn write_array<W: Write>(
    out: &mut W,
    ty: &str,
    name: &str,
    entries: &[Instance],
) -> Result<(), LinkError> {
    let body: Vec<String> = entries
        .iter()
        .map(|e| crate::codegen::indented(&format!("\n{e}")))
        .collect();
    writeln!(out, "const {ty} {name}[] = {{{}\n}};\n", body.join(","))?;
    Ok(())
}

fn write_plain_array<W: Write>(
    out: &mut W,
    ty: &str,
    name: &str,
    entries: &[String],
) -> Result<(), LinkError> {
    let body: Vec<String> = entries
        .iter()
        .map(|e| crate::codegen::indented(&format!("\n{e}")))
        .collect();
    writeln!(out, "const {ty} {name}[] = {{{}\n}};\n", body.join(","))?;
    Ok(())
}

fn write_phf_array<W: Write>(
    out: &mut W,
    name: &str,
    ty: &str,
    values: &[u32],
) -> Result<(), LinkError> {
    write!(out, "const {ty} {name}[] = {{")?;
    for (idx, v) in values.iter().enumerate() {
        if idx % 8 == 0 {
            write!(out, "\n ")?;
        }
        write!(out, " 0x{v:08x},")?;
    }
    writeln!(out, "\n}};\n")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_iid() {
        let groups = split_iid("01234567-89ab-cdef-0123-456789abcdef").unwrap();
        assert_eq!(groups[0], "01234567");
        assert_eq!(groups[1], "89ab");
        assert_eq!(groups[2], "cdef");
        assert_eq!(&groups[3..], ["01", "23", "45", "67", "89", "ab", "cd", "ef"]);
    }

    #[test]
    fn test_iid_bytes_are_little_endian_per_group() {
        let bytes = iid_bytes("01234567-89ab-cdef-0123-456789abcdef").unwrap();
        assert_eq!(
            bytes,
            vec![
                0x67, 0x45, 0x23, 0x01, // first group reversed
                0xab, 0x89, 0xef, 0xcd, // two 16-bit groups reversed
                0x01, 0x23, 0x45, 0x67, 0x89, 0xab, 0xcd, 0xef, // byte groups
            ]
        );
    }

    #[test]
    fn test_invalid_iids_rejected() {
        assert!(matches!(iid_bytes("not-an-iid"), Err(LinkError::InvalidIid(_))));
        assert!(matches!(
            iid_bytes("01234567-89ab-cdef-0123-456789abcdeg"),
            Err(LinkError::InvalidIid(_))
        ));
    }

    #[test]
    fn test_lower_uuid_format() {
        assert_eq!(
            lower_uuid("01234567-89ab-cdef-0123-456789abcdef").unwrap(),
            "{0x01234567, 0x89ab, 0xcdef, \
             {0x01, 0x23, 0x45, 0x67, 0x89, 0xab, 0xcd, 0xef}}"
        );
    }

    #[test]
    fn test_describe_type() {
        let mut iface = TypeDescriptor::new("TD_INTERFACE_TYPE");
        iface.name = Some("nsIFoo".into());
        assert_eq!(describe_type(&iface), "nsIFoo");

        let mut arr = TypeDescriptor::new("TD_ARRAY");
        arr.size_is = Some(1);
        arr.element = Some(Box::new(TypeDescriptor::new("TD_INT32")));
        assert_eq!(describe_type(&arr), "int32[size_is=1]");

        let mut sized = TypeDescriptor::new("TD_PSTRING_SIZE_IS");
        sized.size_is = Some(2);
        assert_eq!(describe_type(&sized), "pstring_size_is(size_is=2)");
    }
}
