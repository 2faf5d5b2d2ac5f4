//! Compiled-module container and lexical scope resolution for a
//! scripting-language toolchain.
//!
//! The front end drives a [`CompilationSession`] per unit: it feeds source
//! positions to the tracker, binds and resolves names through the scope
//! stack, and fills the module builder. A finished [`Module`] is immutable
//! and serializes to a compact binary image that the loader side
//! ([`ModuleRegistry`], [`Package`]) reads back.
//!
//! [`CompilationSession`]: session::CompilationSession
//! [`Module`]: module::Module
//! [`ModuleRegistry`]: module::ModuleRegistry
//! [`Package`]: module::Package

pub mod config;
pub mod diagnostics;
pub mod driver;
pub mod module;
pub mod scope;
pub mod session;
pub mod syntax;

#[cfg(test)]
mod session_test;
