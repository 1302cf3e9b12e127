//! Infrastructure adapters for application ports.

#![forbid(unsafe_code)]

mod arm_resource_group_directory;
mod client_credentials_token_provider;
mod in_memory_resource_group_directory;
mod reqwest_http_sender;
mod static_token_provider;

#[cfg(test)]
mod test_http_server;

pub use arm_resource_group_directory::ArmResourceGroupDirectory;
pub use client_credentials_token_provider::{
    AZURE_PUBLIC_AUTHORITY_HOST, ClientCredentialsTokenProvider,
};
pub use in_memory_resource_group_directory::InMemoryResourceGroupDirectory;
pub use reqwest_http_sender::ReqwestHttpSender;
pub use static_token_provider::StaticTokenProvider;
