// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! CRD YAML Generator
//!
//! Generates Kubernetes CRD YAML files from the Rust types in src/crd.rs.
//!
//! Usage:
//!   cargo run --bin crdgen            # write deploy/crds/*.crd.yaml
//!   cargo run --bin crdgen -- --stdout  # print one multi-document stream

use kube::CustomResourceExt;
use nextdns_operator::crd::{NextDNSAllowlist, NextDNSDenylist, NextDNSProfile, NextDNSTLDList};
use std::fs;
use std::path::Path;

const COPYRIGHT_HEADER: &str = "# Copyright (c) 2025 Erick Bourgeois, firestoned
# SPDX-License-Identifier: MIT
#
# This file is AUTO-GENERATED from src/crd.rs
# DO NOT EDIT MANUALLY - Run `cargo run --bin crdgen` to regenerate
#
";

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let crds = [
        ("nextdnsprofiles.crd.yaml", render::<NextDNSProfile>()?),
        ("nextdnsallowlists.crd.yaml", render::<NextDNSAllowlist>()?),
        ("nextdnsdenylists.crd.yaml", render::<NextDNSDenylist>()?),
        ("nextdnstldlists.crd.yaml", render::<NextDNSTLDList>()?),
    ];

    if std::env::args().any(|arg| arg == "--stdout") {
        let documents: Vec<&str> = crds.iter().map(|(_, yaml)| yaml.as_str()).collect();
        print!("{}", documents.join("---\n"));
        return Ok(());
    }

    let output_dir = Path::new("deploy/crds");
    fs::create_dir_all(output_dir)?;

    println!("Generating CRD YAML files from src/crd.rs...");
    for (filename, yaml) in &crds {
        fs::write(output_dir.join(filename), format!("{COPYRIGHT_HEADER}{yaml}"))?;
        println!("  ✓ Generated {filename}");
    }
    println!("✓ Successfully generated CRD YAML files in deploy/crds/");

    Ok(())
}

fn render<T: CustomResourceExt>() -> Result<String, serde_yaml::Error> {
    serde_yaml::to_string(&T::crd())
}
