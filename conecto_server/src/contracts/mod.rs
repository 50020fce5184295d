//! Generated contract bindings.
//!
//! Each binding is produced by `abigen!` from the contract's JSON ABI under
//! `abi/`; method selectors and parameter encoding are derived mechanically
//! from the interface description. No validation happens here beyond what
//! the ABI encoding itself requires.

use ethers::contract::abigen;

abigen!(Conecto, "abi/Conecto.json");

abigen!(DropErc1155, "abi/DropERC1155.json");

abigen!(TwFactory, "abi/TWFactory.json");
