//! XPIDL Resolver
//!
//! Turns parsed IDL into a fully typed interface model: names are bound
//! across `#include` graphs, attribute lists are interpreted, constants
//! are evaluated and every structural rule is checked. Code generators
//! consume [`ResolvedUnit`]s together with the resolver's [`TypeTable`].

pub mod builtins;
pub mod diagnostic;
pub mod error;
pub mod expr;
pub mod interface;
pub mod names;
pub mod resolver;
pub mod types;
pub mod webidl;

pub use error::{ResolveError, UnsupportedTargetError, Warning};
pub use interface::{
    AttributeMember, ConstMember, Interface, InterfaceAttributes, Member, MethodMember, Param,
    Sentinel,
};
pub use names::NameMap;
pub use resolver::{ResolvedProduction, ResolvedUnit, Resolver};
pub use types::{CallType, NativeModifier, TypeNode, TypeRef, TypeTable};
pub use webidl::{WebIdlConfig, WebIdlEntry};
