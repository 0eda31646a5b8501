//! Typed EthPM v3 manifest.
//!
//! Field names follow the wire format (camelCase). Every collection is
//! optional on the wire and decodes to an empty collection when absent.
//! Unknown fields are ignored; the validator, not this model, decides what a
//! conforming document looks like.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::errors::{ConformError, ConformResult};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PackageManifest {
    pub manifest: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<PackageMeta>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub sources: BTreeMap<String, Source>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub contract_types: BTreeMap<String, ContractType>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub compilers: Vec<CompilerInformation>,
    /// Blockchain URI, then contract instance name.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub deployments: BTreeMap<String, BTreeMap<String, ContractInstance>>,
    /// Package name to content-addressed URI.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub build_dependencies: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageMeta {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub authors: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub license: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub keywords: Vec<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub links: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Source {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub checksum: Option<Checksum>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub urls: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub install_path: Option<String>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub source_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub license: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Checksum {
    pub algorithm: String,
    pub hash: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContractType {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contract_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deployment_bytecode: Option<Bytecode>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub runtime_bytecode: Option<Bytecode>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub abi: Option<Vec<Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub userdoc: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub devdoc: Option<Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bytecode {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bytecode: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub link_references: Vec<LinkReference>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub link_dependencies: Vec<LinkValue>,
}

/// A placeholder inside bytecode that must be filled before deployment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkReference {
    pub offsets: Vec<u64>,
    pub length: u64,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkValue {
    pub offsets: Vec<u64>,
    #[serde(rename = "type")]
    pub kind: LinkValueKind,
    pub value: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LinkValueKind {
    Literal,
    Reference,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompilerInformation {
    pub name: String,
    pub version: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub settings: Option<Value>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub contract_types: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContractInstance {
    /// Contract alias, or `<package>:<name>` for a dependency's type.
    pub contract_type: String,
    pub address: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transaction: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub block: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub runtime_bytecode: Option<Bytecode>,
}

/// Counts describing a decoded manifest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PackageSummary {
    pub name: Option<String>,
    pub version: Option<String>,
    pub sources: usize,
    pub contract_types: usize,
    pub compilers: usize,
    /// Distinct chains with deployments.
    pub deployments: usize,
    pub contract_instances: usize,
    pub build_dependencies: usize,
}

impl PackageManifest {
    pub fn deserialize_from(v: &Value) -> ConformResult<Self> {
        Self::deserialize(v)
            .map_err(|e| ConformError::serialization(format!("failed to decode manifest: {e}")))
    }

    pub fn summary(&self) -> PackageSummary {
        PackageSummary {
            name: self.name.clone(),
            version: self.version.clone(),
            sources: self.sources.len(),
            contract_types: self.contract_types.len(),
            compilers: self.compilers.len(),
            deployments: self.deployments.len(),
            contract_instances: self.deployments.values().map(BTreeMap::len).sum(),
            build_dependencies: self.build_dependencies.len(),
        }
    }
}
