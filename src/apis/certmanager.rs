// Copyright (c) 2025 Nikolay Denev <ndenev@gmail.com>
// SPDX-License-Identifier: BSD-3-Clause

//! cert-manager issuer resources (`cert-manager.io/v1alpha2`)
//!
//! `ClusterIssuer` is cluster-scoped, `Issuer` is namespaced. Both carry the
//! same issuer configuration and status.

use kube::CustomResource;
use serde::{Deserialize, Serialize};
use std::fmt;

/// API group of the cert-manager resources
pub const GROUP: &str = "cert-manager.io";

/// Condition type reported once an issuer is ready to sign certificates
pub const CONDITION_READY: &str = "Ready";

/// Spec of a cluster-scoped issuer
#[derive(CustomResource, Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
#[kube(
    group = "cert-manager.io",
    version = "v1alpha2",
    kind = "ClusterIssuer",
    plural = "clusterissuers",
    status = "IssuerStatus",
    derive = "PartialEq",
    derive = "Default",
    schema = "disabled"
)]
pub struct ClusterIssuerSpec {
    #[serde(flatten)]
    pub config: IssuerConfig,
}

/// Spec of a namespaced issuer
#[derive(CustomResource, Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
#[kube(
    group = "cert-manager.io",
    version = "v1alpha2",
    kind = "Issuer",
    plural = "issuers",
    namespaced,
    status = "IssuerStatus",
    derive = "PartialEq",
    derive = "Default",
    schema = "disabled"
)]
pub struct IssuerSpec {
    #[serde(flatten)]
    pub config: IssuerConfig,
}

/// Backend configuration of an issuer; exactly one backend is expected to be set
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct IssuerConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub acme: Option<AcmeIssuer>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ca: Option<CaIssuer>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vault: Option<VaultIssuer>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub self_signed: Option<SelfSignedIssuer>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub venafi: Option<serde_json::Value>,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AcmeIssuer {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    pub server: String,
    #[serde(default)]
    pub skip_tls_verify: bool,
    pub private_key_secret_ref: SecretKeySelector,
    /// Challenge solvers, kept as raw JSON
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub solvers: Vec<serde_json::Value>,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SecretKeySelector {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CaIssuer {
    pub secret_name: String,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct VaultIssuer {
    pub server: String,
    pub path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ca_bundle: Option<String>,
    #[serde(default)]
    pub auth: serde_json::Value,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct SelfSignedIssuer {}

/// Which backend an issuer is configured with
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IssuerType {
    Acme,
    Ca,
    Vault,
    SelfSigned,
    Venafi,
    Unknown,
}

impl fmt::Display for IssuerType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            IssuerType::Acme => "ACME",
            IssuerType::Ca => "CA",
            IssuerType::Vault => "Vault",
            IssuerType::SelfSigned => "SelfSigned",
            IssuerType::Venafi => "Venafi",
            IssuerType::Unknown => "Unknown",
        };
        f.write_str(name)
    }
}

impl IssuerConfig {
    /// The first configured backend, in cert-manager's precedence order
    pub fn issuer_type(&self) -> IssuerType {
        if self.acme.is_some() {
            IssuerType::Acme
        } else if self.ca.is_some() {
            IssuerType::Ca
        } else if self.vault.is_some() {
            IssuerType::Vault
        } else if self.self_signed.is_some() {
            IssuerType::SelfSigned
        } else if self.venafi.is_some() {
            IssuerType::Venafi
        } else {
            IssuerType::Unknown
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct IssuerStatus {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub conditions: Vec<IssuerCondition>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub acme: Option<AcmeIssuerStatus>,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct IssuerCondition {
    #[serde(rename = "type")]
    pub type_: String,
    /// "True", "False" or "Unknown"
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_transition_time: Option<String>,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AcmeIssuerStatus {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uri: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_registered_email: Option<String>,
}

impl IssuerStatus {
    pub fn condition(&self, type_: &str) -> Option<&IssuerCondition> {
        self.conditions.iter().find(|c| c.type_ == type_)
    }
}

/// Accessors shared by `ClusterIssuer` and `Issuer`
pub trait IssuerObject {
    fn config(&self) -> &IssuerConfig;
    fn issuer_status(&self) -> Option<&IssuerStatus>;

    /// True when the `Ready` condition is `True`
    fn is_ready(&self) -> bool {
        self.issuer_status()
            .and_then(|s| s.condition(CONDITION_READY))
            .is_some_and(|c| c.status == "True")
    }
}

impl IssuerObject for ClusterIssuer {
    fn config(&self) -> &IssuerConfig {
        &self.spec.config
    }

    fn issuer_status(&self) -> Option<&IssuerStatus> {
        self.status.as_ref()
    }
}

impl IssuerObject for Issuer {
    fn config(&self) -> &IssuerConfig {
        &self.spec.config
    }

    fn issuer_status(&self) -> Option<&IssuerStatus> {
        self.status.as_ref()
    }
}
