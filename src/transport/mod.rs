//! Per-transport frame build/parse and byte-fed receiver state machines
//! across the three wire transports.
//!
//! Each submodule is independent and shares nothing but the [`Adu`] they
//! produce/consume — there is deliberately no `Transport` trait here: RTU,
//! ASCII and TCP receivers track genuinely different state (timing gaps,
//! delimiter characters, a length prefix), and forcing a common shape on
//! them would just mean an enum or associated type nobody needs.

pub mod ascii;
pub mod rtu;
pub mod tcp;
