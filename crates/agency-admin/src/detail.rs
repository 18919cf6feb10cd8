//! Typed inbox records and their read-only detail modal

use agency_core::{
    Record,
    utils::{format_money, truncate},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

use crate::{
    callback::{ActionQueue, Callback},
    error::{AdminError, AdminResult},
    modal::{ContentModal, ModalButton, ModalView},
};

/// Declares a status enum with kebab-case wire names, labels and parsing
macro_rules! status_enum {
    ($(#[$meta:meta])* $name:ident { $($(#[$vmeta:meta])* $variant:ident => $wire:literal, $label:literal;)+ }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(rename_all = "kebab-case")]
        pub enum $name {
            $($(#[$vmeta])* $variant,)+
        }

        impl $name {
            /// Every status in workflow order
            pub const ALL: &'static [Self] = &[$(Self::$variant),+];

            /// Wire name
            pub const fn as_str(self) -> &'static str {
                match self {
                    $(Self::$variant => $wire,)+
                }
            }

            /// Display label
            pub const fn label(self) -> &'static str {
                match self {
                    $(Self::$variant => $label,)+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.label())
            }
        }

        impl FromStr for $name {
            type Err = AdminError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let wanted = s.trim().to_ascii_lowercase().replace([' ', '_'], "-");
                Self::ALL
                    .iter()
                    .copied()
                    .find(|status| status.as_str() == wanted)
                    .ok_or_else(|| {
                        let known: Vec<&str> = Self::ALL.iter().copied().map(Self::as_str).collect();
                        AdminError::validation(
                            "status",
                            format!("unknown status '{s}', expected one of: {}", known.join(", ")),
                        )
                    })
            }
        }
    };
}

status_enum! {
    /// Sales pipeline stage of a lead
    LeadStatus {
        /// Not yet contacted
        New => "new", "New";
        /// First contact made
        Contacted => "contacted", "Contacted";
        /// Confirmed fit
        Qualified => "qualified", "Qualified";
        /// Became a client
        Converted => "converted", "Converted";
        /// Dropped out
        Lost => "lost", "Lost";
    }
}

status_enum! {
    /// Handling state of a contact message
    MessageStatus {
        /// Not opened
        Unread => "unread", "Unread";
        /// Opened
        Read => "read", "Read";
        /// Answered
        Replied => "replied", "Replied";
        /// Filed away
        Archived => "archived", "Archived";
    }
}

status_enum! {
    /// Hiring stage of a job application
    ApplicationStatus {
        /// Received
        Pending => "pending", "Pending";
        /// Under review
        Reviewing => "reviewing", "Reviewing";
        /// Interview scheduled
        Interview => "interview", "Interview";
        /// Offer made
        Offered => "offered", "Offered";
        /// Turned down
        Rejected => "rejected", "Rejected";
        /// Joined
        Hired => "hired", "Hired";
    }
}

status_enum! {
    /// Newsletter subscription state
    SubscriberStatus {
        /// Receiving mail
        Active => "active", "Active";
        /// Opted out
        Unsubscribed => "unsubscribed", "Unsubscribed";
        /// Address rejects mail
        Bounced => "bounced", "Bounced";
    }
}

/// Which inbox a record belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum InboxKind {
    /// Sales leads
    Leads,
    /// Contact form messages
    Messages,
    /// Newsletter subscribers
    Newsletter,
    /// Job applications
    JobApplications,
}

impl InboxKind {
    /// Every inbox, in navigation order
    pub const ALL: [Self; 4] = [
        Self::Leads,
        Self::Messages,
        Self::Newsletter,
        Self::JobApplications,
    ];

    /// Route segment
    pub const fn path(self) -> &'static str {
        match self {
            Self::Leads => "leads",
            Self::Messages => "messages",
            Self::Newsletter => "newsletter",
            Self::JobApplications => "job-applications",
        }
    }

    /// Heading
    pub const fn label(self) -> &'static str {
        match self {
            Self::Leads => "Leads",
            Self::Messages => "Messages",
            Self::Newsletter => "Newsletter",
            Self::JobApplications => "Job Applications",
        }
    }

    /// Parse a route segment
    pub fn from_path(segment: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.path() == segment)
    }
}

/// Sales lead
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Lead {
    /// Identifier
    #[serde(alias = "_id")]
    pub id: String,
    /// Contact name
    pub name: String,
    /// Contact email
    pub email: String,
    /// Phone number
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    /// Company
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company: Option<String>,
    /// Where the lead came from
    pub source: String,
    /// Estimated deal value
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<f64>,
    /// Pipeline stage
    pub status: LeadStatus,
    /// Free-form notes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    /// When the lead arrived
    pub created_at: DateTime<Utc>,
}

/// Contact form message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactMessage {
    /// Identifier
    #[serde(alias = "_id")]
    pub id: String,
    /// Sender name
    pub name: String,
    /// Sender email
    pub email: String,
    /// Subject line
    pub subject: String,
    /// Body
    pub message: String,
    /// Handling state
    pub status: MessageStatus,
    /// When the message arrived
    pub received_at: DateTime<Utc>,
}

/// Job application
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobApplication {
    /// Identifier
    #[serde(alias = "_id")]
    pub id: String,
    /// Applicant name
    pub name: String,
    /// Applicant email
    pub email: String,
    /// Position applied for
    pub position: String,
    /// Years or description of experience
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub experience: Option<String>,
    /// Link to the resume
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resume_url: Option<String>,
    /// Cover letter
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cover_letter: Option<String>,
    /// Hiring stage
    pub status: ApplicationStatus,
    /// When the application arrived
    pub applied_at: DateTime<Utc>,
}

/// Newsletter subscriber
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subscriber {
    /// Identifier
    #[serde(alias = "_id")]
    pub id: String,
    /// Subscriber email
    pub email: String,
    /// Subscriber name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Subscription state
    pub status: SubscriberStatus,
    /// When they subscribed
    pub subscribed_at: DateTime<Utc>,
}

/// Any record shown in an inbox, tagged by kind
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum DetailRecord {
    /// Sales lead
    Lead(Lead),
    /// Contact message
    Message(ContactMessage),
    /// Job application
    JobApplication(JobApplication),
    /// Newsletter subscriber
    Subscriber(Subscriber),
}

fn timestamp(at: &DateTime<Utc>) -> String {
    at.format("%b %-d, %Y %H:%M").to_string()
}

impl DetailRecord {
    /// Identifier
    pub fn id(&self) -> &str {
        match self {
            Self::Lead(lead) => &lead.id,
            Self::Message(message) => &message.id,
            Self::JobApplication(application) => &application.id,
            Self::Subscriber(subscriber) => &subscriber.id,
        }
    }

    /// Inbox this record belongs to
    pub const fn kind(&self) -> InboxKind {
        match self {
            Self::Lead(_) => InboxKind::Leads,
            Self::Message(_) => InboxKind::Messages,
            Self::JobApplication(_) => InboxKind::JobApplications,
            Self::Subscriber(_) => InboxKind::Newsletter,
        }
    }

    /// Heading for the detail modal
    pub fn title(&self) -> String {
        match self {
            Self::Lead(lead) => lead.name.clone(),
            Self::Message(message) => message.subject.clone(),
            Self::JobApplication(application) => {
                format!("{} - {}", application.name, application.position)
            }
            Self::Subscriber(subscriber) => subscriber
                .name
                .clone()
                .unwrap_or_else(|| subscriber.email.clone()),
        }
    }

    /// Wire name of the current status
    pub const fn status(&self) -> &'static str {
        match self {
            Self::Lead(lead) => lead.status.as_str(),
            Self::Message(message) => message.status.as_str(),
            Self::JobApplication(application) => application.status.as_str(),
            Self::Subscriber(subscriber) => subscriber.status.as_str(),
        }
    }

    /// Label of the current status
    pub const fn status_label(&self) -> &'static str {
        match self {
            Self::Lead(lead) => lead.status.label(),
            Self::Message(message) => message.status.label(),
            Self::JobApplication(application) => application.status.label(),
            Self::Subscriber(subscriber) => subscriber.status.label(),
        }
    }

    /// Change the status from its wire name or label
    ///
    /// # Errors
    ///
    /// Returns a validation error if the status does not exist for this kind.
    pub fn set_status(&mut self, status: &str) -> AdminResult<()> {
        match self {
            Self::Lead(lead) => lead.status = status.parse()?,
            Self::Message(message) => message.status = status.parse()?,
            Self::JobApplication(application) => application.status = status.parse()?,
            Self::Subscriber(subscriber) => subscriber.status = status.parse()?,
        }
        Ok(())
    }

    /// Labelled fields shown in the detail modal, absent optionals skipped
    pub fn fields(&self) -> Vec<(&'static str, String)> {
        let mut fields = Vec::new();
        let mut push = |label: &'static str, value: Option<String>| {
            if let Some(value) = value.filter(|v| !v.is_empty()) {
                fields.push((label, value));
            }
        };

        match self {
            Self::Lead(lead) => {
                push("Name", Some(lead.name.clone()));
                push("Email", Some(lead.email.clone()));
                push("Phone", lead.phone.clone());
                push("Company", lead.company.clone());
                push("Source", Some(lead.source.clone()));
                push("Value", lead.value.map(format_money));
                push("Status", Some(lead.status.label().to_string()));
                push("Notes", lead.notes.clone());
                push("Created", Some(timestamp(&lead.created_at)));
            }
            Self::Message(message) => {
                push("From", Some(format!("{} <{}>", message.name, message.email)));
                push("Subject", Some(message.subject.clone()));
                push("Message", Some(message.message.clone()));
                push("Status", Some(message.status.label().to_string()));
                push("Received", Some(timestamp(&message.received_at)));
            }
            Self::JobApplication(application) => {
                push("Name", Some(application.name.clone()));
                push("Email", Some(application.email.clone()));
                push("Position", Some(application.position.clone()));
                push("Experience", application.experience.clone());
                push("Resume", application.resume_url.clone());
                push("Cover Letter", application.cover_letter.clone());
                push("Status", Some(application.status.label().to_string()));
                push("Applied", Some(timestamp(&application.applied_at)));
            }
            Self::Subscriber(subscriber) => {
                push("Email", Some(subscriber.email.clone()));
                push("Name", subscriber.name.clone());
                push("Status", Some(subscriber.status.label().to_string()));
                push("Subscribed", Some(timestamp(&subscriber.subscribed_at)));
            }
        }
        fields
    }

    /// Flat record for the data table: typed fields rendered as display text
    pub fn to_row(&self) -> Record {
        let mut row = Record::new().with("id", self.id());
        match self {
            Self::Lead(lead) => {
                row.insert("name", lead.name.as_str());
                row.insert("email", lead.email.as_str());
                row.insert("company", lead.company.clone().unwrap_or_default());
                row.insert("source", lead.source.as_str());
                row.insert("value", lead.value.map(format_money).unwrap_or_default());
                row.insert("created", timestamp(&lead.created_at));
            }
            Self::Message(message) => {
                row.insert("name", message.name.as_str());
                row.insert("email", message.email.as_str());
                row.insert("subject", message.subject.as_str());
                row.insert("preview", truncate(&message.message, 50));
                row.insert("received", timestamp(&message.received_at));
            }
            Self::JobApplication(application) => {
                row.insert("name", application.name.as_str());
                row.insert("email", application.email.as_str());
                row.insert("position", application.position.as_str());
                row.insert(
                    "experience",
                    application.experience.clone().unwrap_or_default(),
                );
                row.insert("applied", timestamp(&application.applied_at));
            }
            Self::Subscriber(subscriber) => {
                row.insert("email", subscriber.email.as_str());
                row.insert("name", subscriber.name.clone().unwrap_or_default());
                row.insert("subscribed", timestamp(&subscriber.subscribed_at));
            }
        }
        row.insert("status", self.status_label());
        row
    }
}

/// Rendered detail body
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DetailView {
    /// Inbox label, shown above the title
    pub kind: &'static str,
    /// Status label
    pub status: &'static str,
    /// Labelled fields
    pub fields: Vec<(&'static str, String)>,
}

/// Read-only viewer for one inbox record
#[derive(Debug, Clone)]
pub struct DetailModal {
    record: Option<DetailRecord>,
    modal: ContentModal,
    events: ActionQueue<ModalButton>,
}

impl Default for DetailModal {
    fn default() -> Self {
        Self::new()
    }
}

impl DetailModal {
    /// Closed viewer
    pub fn new() -> Self {
        let events: ActionQueue<ModalButton> = ActionQueue::new();
        let on_close: Callback<()> = events.sender(|()| ModalButton::Close);
        Self {
            record: None,
            modal: ContentModal::new("", on_close),
            events,
        }
    }

    /// Show `record`
    pub fn open(&mut self, record: DetailRecord) {
        self.modal.set_title(record.title());
        self.modal.set_show(true);
        self.record = Some(record);
    }

    /// Hide the viewer
    pub fn close(&mut self) {
        self.modal.set_show(false);
        self.record = None;
    }

    /// Record on display
    pub const fn record(&self) -> Option<&DetailRecord> {
        self.record.as_ref()
    }

    /// Press the close control; takes effect on the next [`Self::process_events`]
    pub fn press_close(&self) -> bool {
        self.modal.press(ModalButton::Close)
    }

    /// Apply queued close presses
    pub fn process_events(&mut self) {
        if !self.events.drain().is_empty() {
            self.close();
        }
    }

    /// Render, `None` while closed
    pub fn render(&self) -> Option<ModalView<DetailView>> {
        let record = self.record.as_ref()?;
        self.modal.render(|| DetailView {
            kind: record.kind().label(),
            status: record.status_label(),
            fields: record.fields(),
        })
    }
}

#[cfg(test)]
#[allow(clippy::missing_panics_doc)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn lead() -> DetailRecord {
        serde_json::from_value(json!({
            "kind": "lead",
            "_id": "l1",
            "name": "Dana Scott",
            "email": "dana@example.com",
            "company": "Acme",
            "source": "Website",
            "value": 12500.0,
            "status": "new",
            "created_at": "2024-03-05T14:30:00Z"
        }))
        .unwrap()
    }

    #[test]
    fn test_tagged_deserialization() {
        let record = lead();
        assert_eq!(record.kind(), InboxKind::Leads);
        assert_eq!(record.id(), "l1");
        assert_eq!(record.status(), "new");

        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value["kind"], "lead");
        assert_eq!(value["id"], "l1");
    }

    #[test]
    fn test_status_parsing() {
        assert_eq!("Qualified".parse::<LeadStatus>().unwrap(), LeadStatus::Qualified);
        assert_eq!(
            "In Review".parse::<ApplicationStatus>().ok(),
            None::<ApplicationStatus>
        );
        assert_eq!(
            " UNSUBSCRIBED ".parse::<SubscriberStatus>().unwrap(),
            SubscriberStatus::Unsubscribed
        );
        assert!("archived".parse::<LeadStatus>().is_err());
        assert_eq!(InboxKind::from_path("job-applications"), Some(InboxKind::JobApplications));
    }

    #[test]
    fn test_set_status_is_per_kind() {
        let mut record = lead();
        record.set_status("contacted").unwrap();
        assert_eq!(record.status_label(), "Contacted");
        assert!(record.set_status("replied").is_err());
        assert_eq!(record.status(), "contacted");
    }

    #[test]
    fn test_fields_skip_missing_optionals() {
        let fields = lead().fields();
        let labels: Vec<&str> = fields.iter().map(|(label, _)| *label).collect();
        assert_eq!(
            labels,
            vec!["Name", "Email", "Company", "Source", "Value", "Status", "Created"]
        );
        assert_eq!(fields[4].1, "$12500.00");
        assert_eq!(fields[6].1, "Mar 5, 2024 14:30");
    }

    #[test]
    fn test_row_is_searchable_text() {
        let row = lead().to_row();
        assert_eq!(row.id().as_deref(), Some("l1"));
        assert_eq!(row.text("status"), Some("New"));
        assert_eq!(row.text("value"), Some("$12500.00"));
    }

    #[test]
    fn test_detail_modal_lifecycle() {
        let mut modal = DetailModal::new();
        assert!(modal.render().is_none());

        modal.open(lead());
        let view = modal.render().unwrap();
        assert_eq!(view.title, "Dana Scott");
        assert!(view.footer.is_none());
        assert_eq!(view.body.kind, "Leads");

        assert!(modal.press_close());
        modal.process_events();
        assert!(modal.record().is_none());
        assert!(modal.render().is_none());
    }
}
