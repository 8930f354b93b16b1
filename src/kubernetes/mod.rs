// Copyright (c) 2025 Nikolay Denev <ndenev@gmail.com>
// SPDX-License-Identifier: BSD-3-Clause

pub mod labels;
pub mod lister;
pub mod loader;
pub mod store;

pub use labels::{Operator, Requirement, Selector, SelectorError};
pub use lister::{
    ClusterIssuerLister, Error, GroupResource, IssuerLister, Lister, NamespaceLister,
    new_cluster_issuer_lister, new_issuer_lister,
};
pub use store::{Indexer, MemoryStore, StoreError, meta_namespace_key};
