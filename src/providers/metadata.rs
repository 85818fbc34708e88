//! Provider Metadata
//!
//! Declarative descriptors for the providers the toolkit knows about:
//! display names, credential labels, documentation links and the
//! ISO 3166 codes of the locations each provider serves.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Kind of service a provider exposes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderType {
    Compute,
    BlobStore,
}

impl std::fmt::Display for ProviderType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProviderType::Compute => write!(f, "compute"),
            ProviderType::BlobStore => write!(f, "blobstore"),
        }
    }
}

/// Static description of a provider
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderMetadata {
    pub id: String,
    pub provider_type: ProviderType,
    pub name: String,
    /// Label of the identity credential (e.g. "Access Key ID")
    pub identity_name: String,
    /// Label of the secret credential
    pub credential_name: Option<String>,
    pub homepage: String,
    pub console: Option<String>,
    pub api_documentation: String,
    /// Providers sharing the same account
    pub linked_services: BTreeSet<String>,
    pub iso3166_codes: BTreeSet<String>,
}

fn set(items: &[&str]) -> BTreeSet<String> {
    items.iter().map(|s| s.to_string()).collect()
}

const AWS_LINKED: &[&str] = &["aws-ec2", "aws-elb", "aws-s3", "aws-simpledb"];

impl ProviderMetadata {
    pub fn aws_ec2() -> Self {
        Self {
            id: "aws-ec2".into(),
            provider_type: ProviderType::Compute,
            name: "Amazon Elastic Compute Cloud (EC2)".into(),
            identity_name: "Access Key ID".into(),
            credential_name: Some("Secret Access Key".into()),
            homepage: "http://aws.amazon.com/ec2".into(),
            console: Some("https://console.aws.amazon.com/ec2/home".into()),
            api_documentation: "http://docs.amazonwebservices.com/AWSEC2/latest/APIReference"
                .into(),
            linked_services: set(AWS_LINKED),
            iso3166_codes: set(&[
                "US-VA", "US-CA", "US-OR", "BR-SP", "IE", "SG", "AU-NSW", "JP-13",
            ]),
        }
    }

    pub fn aws_s3() -> Self {
        Self {
            id: "aws-s3".into(),
            provider_type: ProviderType::BlobStore,
            name: "Amazon Simple Storage Service (S3)".into(),
            identity_name: "Access Key ID".into(),
            credential_name: Some("Secret Access Key".into()),
            homepage: "http://aws.amazon.com/s3/".into(),
            console: Some("https://console.aws.amazon.com/s3/home".into()),
            api_documentation: "http://docs.amazonwebservices.com/AmazonS3/latest/API".into(),
            linked_services: set(AWS_LINKED),
            iso3166_codes: set(&["US", "US-CA", "IE", "SG", "JP-13"]),
        }
    }

    pub fn gogrid() -> Self {
        Self {
            id: "gogrid".into(),
            provider_type: ProviderType::Compute,
            name: "GoGrid".into(),
            identity_name: "API Key".into(),
            credential_name: Some("Shared Secret".into()),
            homepage: "http://www.gogrid.com".into(),
            console: Some("https://my.gogrid.com/gogrid".into()),
            api_documentation: "https://wiki.gogrid.com/wiki/index.php/API".into(),
            linked_services: set(&["gogrid"]),
            iso3166_codes: set(&["US-CA", "US-VA", "NL-NH"]),
        }
    }

    pub fn vcloud() -> Self {
        Self {
            id: "vcloud".into(),
            provider_type: ProviderType::Compute,
            name: "VMware vCloud API".into(),
            identity_name: "User at Organization (user@org)".into(),
            credential_name: Some("Password".into()),
            homepage: "http://communities.vmware.com/community/vmtn/developer/forums/vcloudapi"
                .into(),
            console: None,
            api_documentation: "http://www.vmware.com/support/pubs/vcd_pubs.html".into(),
            linked_services: set(&["vcloud"]),
            iso3166_codes: BTreeSet::new(),
        }
    }
}

/// Lookup table of known providers
#[derive(Debug, Clone)]
pub struct ProviderCatalog {
    providers: Vec<ProviderMetadata>,
}

impl ProviderCatalog {
    pub fn new(providers: Vec<ProviderMetadata>) -> Self {
        Self { providers }
    }

    /// Every provider shipped with the toolkit
    pub fn builtin() -> Self {
        Self::new(vec![
            ProviderMetadata::aws_ec2(),
            ProviderMetadata::aws_s3(),
            ProviderMetadata::gogrid(),
            ProviderMetadata::vcloud(),
        ])
    }

    pub fn get(&self, id: &str) -> Option<&ProviderMetadata> {
        self.providers.iter().find(|p| p.id == id)
    }

    pub fn of_type(&self, provider_type: ProviderType) -> impl Iterator<Item = &ProviderMetadata> {
        self.providers
            .iter()
            .filter(move |p| p.provider_type == provider_type)
    }

    pub fn all(&self) -> &[ProviderMetadata] {
        &self.providers
    }
}

impl Default for ProviderCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}
