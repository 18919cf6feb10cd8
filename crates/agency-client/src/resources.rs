//! Backend resources and what each one supports

use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

/// Content resources exposed under the API prefix
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Resource {
    /// Blog posts
    Blogs,
    /// Case studies
    CaseStudies,
    /// Portfolio items
    Portfolio,
    /// Products
    Products,
    /// Services
    Services,
    /// Client reviews
    Reviews,
    /// Job openings
    Careers,
}

/// A CRUD operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Operation {
    /// `POST /{resource}`
    Create,
    /// `GET /{resource}`
    Read,
    /// `PUT /{resource}/{id}`
    Update,
    /// `DELETE /{resource}/{id}`
    Delete,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Create => "create",
            Self::Read => "read",
            Self::Update => "update",
            Self::Delete => "delete",
        };
        f.write_str(name)
    }
}

/// Which operations the backend actually implements for a resource
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Capabilities {
    /// Create supported
    pub create: bool,
    /// List supported
    pub read: bool,
    /// Update supported
    pub update: bool,
    /// Delete supported
    pub delete: bool,
}

impl Capabilities {
    /// Every operation available
    pub const FULL: Self = Self {
        create: true,
        read: true,
        update: true,
        delete: true,
    };

    /// No update endpoint
    pub const NO_UPDATE: Self = Self {
        update: false,
        ..Self::FULL
    };

    /// Whether the operation is supported
    pub const fn supports(&self, operation: Operation) -> bool {
        match operation {
            Operation::Create => self.create,
            Operation::Read => self.read,
            Operation::Update => self.update,
            Operation::Delete => self.delete,
        }
    }
}

impl Default for Capabilities {
    fn default() -> Self {
        Self::FULL
    }
}

impl Resource {
    /// Every resource, in navigation order
    pub const ALL: [Self; 7] = [
        Self::Blogs,
        Self::CaseStudies,
        Self::Portfolio,
        Self::Products,
        Self::Services,
        Self::Reviews,
        Self::Careers,
    ];

    /// Path segment under the API prefix
    pub const fn path(self) -> &'static str {
        match self {
            Self::Blogs => "blogs",
            Self::CaseStudies => "case-studies",
            Self::Portfolio => "portfolio",
            Self::Products => "products",
            Self::Services => "services",
            Self::Reviews => "reviews",
            Self::Careers => "careers",
        }
    }

    /// Plural heading
    pub const fn label(self) -> &'static str {
        match self {
            Self::Blogs => "Blog Posts",
            Self::CaseStudies => "Case Studies",
            Self::Portfolio => "Portfolio",
            Self::Products => "Products",
            Self::Services => "Services",
            Self::Reviews => "Reviews",
            Self::Careers => "Careers",
        }
    }

    /// Singular noun used in modal titles and messages
    pub const fn singular(self) -> &'static str {
        match self {
            Self::Blogs => "Blog Post",
            Self::CaseStudies => "Case Study",
            Self::Portfolio => "Portfolio Item",
            Self::Products => "Product",
            Self::Services => "Service",
            Self::Reviews => "Review",
            Self::Careers => "Job Opening",
        }
    }

    /// Backend capabilities
    ///
    /// Reviews and case studies have no update endpoint; edits to them are
    /// applied locally only.
    pub const fn capabilities(self) -> Capabilities {
        match self {
            Self::Reviews | Self::CaseStudies => Capabilities::NO_UPDATE,
            Self::Blogs | Self::Portfolio | Self::Products | Self::Services | Self::Careers => {
                Capabilities::FULL
            }
        }
    }
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

impl FromStr for Resource {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase().replace('_', "-");
        Self::ALL
            .into_iter()
            .find(|resource| resource.path() == wanted)
            .ok_or_else(|| format!("unknown resource '{s}'"))
    }
}
