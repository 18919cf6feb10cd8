//! Columns and form fields for each content resource

use agency_client::{Capabilities, Resource};
use agency_core::{
    FieldValue, Record,
    utils::{format_money, format_rating, truncate},
};

use crate::{
    form::FormField,
    table::Column,
};

const BLOG_CATEGORIES: &[&str] = &["Marketing", "Design", "Development", "SEO", "Business"];
const PORTFOLIO_CATEGORIES: &[&str] = &[
    "Web Development",
    "Mobile App",
    "UI/UX Design",
    "Branding",
    "E-commerce",
];
const PRODUCT_CATEGORIES: &[&str] = &["Template", "Plugin", "Course", "Service Package"];
const DEPARTMENTS: &[&str] = &["Engineering", "Design", "Marketing", "Sales", "Operations"];
const JOB_TYPES: &[&str] = &["Full-time", "Part-time", "Contract", "Internship"];

/// Longest excerpt shown in a table cell
const CELL_TEXT_LIMIT: usize = 60;

fn money(value: &FieldValue, _: &Record) -> String {
    match value {
        FieldValue::Number(amount) => amount.as_f64().map(format_money).unwrap_or_default(),
        FieldValue::Text(text) => text
            .trim()
            .trim_start_matches('$')
            .parse::<f64>()
            .map_or_else(|_| text.clone(), format_money),
        other => other.to_display_string(),
    }
}

fn published(value: &FieldValue, _: &Record) -> String {
    if value.as_bool().unwrap_or(false) {
        "Published".to_string()
    } else {
        "Draft".to_string()
    }
}

fn active(value: &FieldValue, _: &Record) -> String {
    if value.as_bool().unwrap_or(false) {
        "Open".to_string()
    } else {
        "Closed".to_string()
    }
}

fn rating(value: &FieldValue, _: &Record) -> String {
    value.as_f64().map_or_else(String::new, format_rating)
}

fn excerpt(value: &FieldValue, _: &Record) -> String {
    truncate(&value.to_display_string(), CELL_TEXT_LIMIT)
}

fn joined(value: &FieldValue, _: &Record) -> String {
    value
        .as_list()
        .map_or_else(|| value.to_display_string(), |items| items.join(", "))
}

fn count(value: &FieldValue, _: &Record) -> String {
    let n = value.as_list().map_or(0, <[String]>::len);
    if n == 1 {
        "1 item".to_string()
    } else {
        format!("{n} items")
    }
}

/// How one resource is listed and edited
#[derive(Debug, Clone)]
pub struct EntitySchema {
    /// Resource described
    pub resource: Resource,
    /// Table columns in display order
    pub columns: Vec<Column>,
    /// Form fields in display order
    pub fields: Vec<FormField>,
}

impl EntitySchema {
    /// Schema for `resource`
    #[allow(clippy::too_many_lines)]
    pub fn for_resource(resource: Resource) -> Self {
        let (columns, fields) = match resource {
            Resource::Blogs => (
                vec![
                    Column::new("title", "Title"),
                    Column::new("author", "Author"),
                    Column::new("category", "Category"),
                    Column::new("published", "Status").with_render(published),
                ],
                vec![
                    FormField::text("title", "Title").required(),
                    FormField::text("author", "Author").required(),
                    FormField::select("category", "Category", BLOG_CATEGORIES),
                    FormField::textarea("excerpt", "Excerpt"),
                    FormField::textarea("content", "Content").required(),
                    FormField::text("image", "Cover Image URL"),
                    FormField::list("tags", "Tags"),
                    FormField::toggle("published", "Published"),
                ],
            ),
            Resource::CaseStudies => (
                vec![
                    Column::new("title", "Title"),
                    Column::new("client", "Client"),
                    Column::new("industry", "Industry"),
                    Column::new("results", "Results").with_render(excerpt),
                ],
                vec![
                    FormField::text("title", "Title").required(),
                    FormField::text("client", "Client").required(),
                    FormField::text("industry", "Industry"),
                    FormField::textarea("challenge", "Challenge"),
                    FormField::textarea("solution", "Solution"),
                    FormField::textarea("results", "Results"),
                    FormField::list("technologies", "Technologies"),
                    FormField::text("image", "Image URL"),
                ],
            ),
            Resource::Portfolio => (
                vec![
                    Column::new("title", "Title"),
                    Column::new("category", "Category"),
                    Column::new("client", "Client"),
                    Column::new("technologies", "Technologies").with_render(joined),
                ],
                vec![
                    FormField::text("title", "Title").required(),
                    FormField::select("category", "Category", PORTFOLIO_CATEGORIES).required(),
                    FormField::text("client", "Client"),
                    FormField::textarea("description", "Description"),
                    FormField::list("technologies", "Technologies"),
                    FormField::text("image", "Image URL"),
                    FormField::text("link", "Project URL"),
                ],
            ),
            Resource::Products => (
                vec![
                    Column::new("name", "Name"),
                    Column::new("category", "Category"),
                    Column::new("pricing", "Price").with_render(money),
                    Column::new("features", "Features").with_render(count),
                ],
                vec![
                    FormField::text("name", "Name").required(),
                    FormField::number("pricing", "Price").required(),
                    FormField::select("category", "Category", PRODUCT_CATEGORIES),
                    FormField::textarea("description", "Description"),
                    FormField::list("features", "Features"),
                ],
            ),
            Resource::Services => (
                vec![
                    Column::new("title", "Title"),
                    Column::new("price", "Starting Price").with_render(money),
                    Column::new("description", "Description").with_render(excerpt),
                ],
                vec![
                    FormField::text("title", "Title").required(),
                    FormField::textarea("description", "Description").required(),
                    FormField::text("icon", "Icon"),
                    FormField::text("price", "Starting Price"),
                    FormField::list("features", "Features"),
                ],
            ),
            Resource::Reviews => (
                vec![
                    Column::new("name", "Client"),
                    Column::new("company", "Company"),
                    Column::new("rating", "Rating").with_render(rating),
                    Column::new("review", "Review").with_render(excerpt),
                ],
                vec![
                    FormField::text("name", "Client Name").required(),
                    FormField::text("company", "Company"),
                    FormField::text("position", "Position"),
                    FormField::number("rating", "Rating").required().default_value(5.0),
                    FormField::textarea("review", "Review").required(),
                    FormField::toggle("featured", "Featured"),
                ],
            ),
            Resource::Careers => (
                vec![
                    Column::new("title", "Title"),
                    Column::new("department", "Department"),
                    Column::new("location", "Location"),
                    Column::new("type", "Type"),
                    Column::new("active", "Status").with_render(active),
                ],
                vec![
                    FormField::text("title", "Title").required(),
                    FormField::select("department", "Department", DEPARTMENTS).required(),
                    FormField::text("location", "Location").required(),
                    FormField::select("type", "Type", JOB_TYPES),
                    FormField::textarea("description", "Description"),
                    FormField::list("requirements", "Requirements"),
                    FormField::toggle("active", "Accepting Applications").default_value(true),
                ],
            ),
        };

        Self {
            resource,
            columns,
            fields,
        }
    }

    /// Backend capabilities of the resource
    pub const fn capabilities(&self) -> Capabilities {
        self.resource.capabilities()
    }

    /// Title of the create modal
    pub fn create_title(&self) -> String {
        format!("Add {}", self.resource.singular())
    }

    /// Title of the edit modal
    pub fn edit_title(&self) -> String {
        format!("Edit {}", self.resource.singular())
    }
}
