//! XPT Typelib Linker
//!
//! Lowers resolved interfaces into flat typelib descriptors and links many
//! descriptor lists into one generated C++ source unit: static data tables
//! plus two perfect hashes for IID and name lookup.

pub mod codegen;
pub mod descriptor;
pub mod error;
pub mod gather;
pub mod linker;
pub mod strings;

pub use descriptor::{
    ConstDescriptor, InterfaceDescriptor, MethodDescriptor, ParamDescriptor, TypeDescriptor,
};
pub use error::LinkError;
pub use gather::gather_descriptors;
pub use linker::{iid_bytes, link_files, link_to_cpp, PHF_SIZE};
pub use strings::StringTable;
