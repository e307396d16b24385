//! Protocol buffer types for Terraform Plugin Protocol v6
//!
//! Generated at build time by tonic_build from `proto/tfplugin6.proto`.
//!
//! RPC request/response types live in snake_case modules
//! (`plan_resource_change::Request`), nested messages in sub-modules
//! (`diagnostic::Severity`), and the service trait is
//! `provider_server::Provider`. Several messages share names with tfplug
//! framework types; always refer to them through `proto::`.

// Include the generated protobuf code from the build output directory
// The file name is based on the proto package name (tfplugin6)
include!(concat!(env!("OUT_DIR"), "/tfplugin6.rs"));

// Re-export the gRPC service trait and server
pub use provider_server::{Provider as ProviderService, ProviderServer};
