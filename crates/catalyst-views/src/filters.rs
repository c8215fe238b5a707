//! List filters for the user, customer and ticket screens

use catalyst_api::{Customer, Ticket, User, OPEN_TICKET_STATUSES};
use chrono::NaiveDate;
use std::collections::BTreeSet;
use std::str::FromStr;

/// Predicate over one kind of record
pub trait Filter<T> {
    fn matches(&self, item: &T) -> bool;

    /// Items that pass, in their original order
    fn apply<'a>(&self, items: &'a [T]) -> Vec<&'a T> {
        items.iter().filter(|item| self.matches(item)).collect()
    }
}

/// Case-insensitive substring match; an empty needle matches anything
fn contains_ci(haystack: &str, needle: &str) -> bool {
    needle.is_empty() || haystack.to_lowercase().contains(&needle.to_lowercase())
}

fn contains_ci_opt(haystack: Option<&str>, needle: &str) -> bool {
    needle.is_empty() || haystack.is_some_and(|h| contains_ci(h, needle))
}

/// Active/inactive selector. Form values: `""` (all), `"true"`, `"false"`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StatusFilter {
    #[default]
    All,
    Active,
    Inactive,
}

impl StatusFilter {
    pub fn matches(&self, active: bool) -> bool {
        match self {
            StatusFilter::All => true,
            StatusFilter::Active => active,
            StatusFilter::Inactive => !active,
        }
    }

    pub fn as_form_value(&self) -> &'static str {
        match self {
            StatusFilter::All => "",
            StatusFilter::Active => "true",
            StatusFilter::Inactive => "false",
        }
    }
}

impl FromStr for StatusFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "" | "all" => Ok(StatusFilter::All),
            "true" | "active" => Ok(StatusFilter::Active),
            "false" | "inactive" => Ok(StatusFilter::Inactive),
            other => Err(format!("invalid status filter '{}'", other)),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserFilter {
    pub username: String,
    pub full_name: String,
    pub email: String,
    /// Exact match; empty means any role
    pub role: String,
    pub status: StatusFilter,
}

impl Filter<User> for UserFilter {
    fn matches(&self, user: &User) -> bool {
        contains_ci(&user.username, &self.username)
            && contains_ci(&user.full_name, &self.full_name)
            && contains_ci_opt(user.email.as_deref(), &self.email)
            && (self.role.is_empty() || user.role == self.role)
            && self.status.matches(user.active)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CustomerFilter {
    pub name: String,
    pub identifier_no: String,
    pub email: String,
    pub phone: String,
    /// Exact match; empty means any type
    pub customer_type: String,
    pub status: StatusFilter,
}

impl Filter<Customer> for CustomerFilter {
    fn matches(&self, customer: &Customer) -> bool {
        contains_ci(&customer.name, &self.name)
            && contains_ci(&customer.identifier_no, &self.identifier_no)
            && contains_ci_opt(customer.email.as_deref(), &self.email)
            && contains_ci_opt(customer.phone.as_deref(), &self.phone)
            && (self.customer_type.is_empty() || customer.customer_type == self.customer_type)
            && self.status.matches(customer.active)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TicketFilter {
    pub code: String,
    pub title: String,
    /// Matched against the assignee's username
    pub assignee: String,
    /// Matched against the reporter's username
    pub reporter: String,
    /// Allowed statuses; empty allows every status
    pub statuses: BTreeSet<String>,
    /// Matched against the requesting customer's name
    pub request_by: String,
    /// Inclusive lower bound on the creation date
    pub created_from: Option<NaiveDate>,
    /// Inclusive upper bound on the creation date
    pub created_to: Option<NaiveDate>,
}

impl Default for TicketFilter {
    fn default() -> Self {
        Self {
            code: String::new(),
            title: String::new(),
            assignee: String::new(),
            reporter: String::new(),
            statuses: OPEN_TICKET_STATUSES.iter().map(|s| s.to_string()).collect(),
            request_by: String::new(),
            created_from: None,
            created_to: None,
        }
    }
}

impl TicketFilter {
    /// Back to the default: only open tickets, no other criteria
    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

impl Filter<Ticket> for TicketFilter {
    fn matches(&self, ticket: &Ticket) -> bool {
        let created = ticket.created_date();

        contains_ci(&ticket.code, &self.code)
            && contains_ci(&ticket.title, &self.title)
            && contains_ci_opt(
                ticket.assignee.as_ref().map(|u| u.username.as_str()),
                &self.assignee,
            )
            && contains_ci_opt(
                ticket.reporter.as_ref().map(|u| u.username.as_str()),
                &self.reporter,
            )
            && (self.statuses.is_empty() || self.statuses.contains(&ticket.status))
            && contains_ci_opt(
                ticket.request_by.as_ref().map(|c| c.name.as_str()),
                &self.request_by,
            )
            && self
                .created_from
                .is_none_or(|from| created.is_some_and(|d| d >= from))
            && self
                .created_to
                .is_none_or(|to| created.is_some_and(|d| d <= to))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use catalyst_api::{CustomerRef, UserRef};

    fn user(username: &str, full_name: &str, email: Option<&str>, role: &str, active: bool) -> User {
        User {
            id: 0,
            username: username.into(),
            email: email.map(str::to_string),
            full_name: full_name.into(),
            first_name: String::new(),
            last_name: String::new(),
            role: role.into(),
            active,
        }
    }

    fn ticket(code: &str, status: &str, created: Option<&str>) -> Ticket {
        Ticket {
            code: code.into(),
            title: format!("Ticket {}", code),
            status: status.into(),
            description: None,
            assignee: Some(UserRef {
                username: "jdoe".into(),
                full_name: None,
            }),
            reporter: None,
            request_by: Some(CustomerRef {
                id: Some(1),
                name: "Acme Corp".into(),
            }),
            created_at_date: created.map(str::to_string),
            due_date: None,
        }
    }

    #[test]
    fn test_status_filter_values() {
        assert_eq!("".parse::<StatusFilter>().unwrap(), StatusFilter::All);
        assert_eq!("true".parse::<StatusFilter>().unwrap(), StatusFilter::Active);
        assert_eq!("false".parse::<StatusFilter>().unwrap(), StatusFilter::Inactive);
        assert!("maybe".parse::<StatusFilter>().is_err());
        assert_eq!(StatusFilter::Inactive.as_form_value(), "false");
    }

    #[test]
    fn test_user_filter() {
        let users = vec![
            user("jdoe", "John Doe", Some("JDoe@Example.com"), "SUPPORT", true),
            user("asmith", "Alice Smith", None, "ADMIN", false),
        ];

        let by_name = UserFilter {
            full_name: "doe".into(),
            ..Default::default()
        };
        assert_eq!(by_name.apply(&users).len(), 1);

        let by_email = UserFilter {
            email: "example".into(),
            ..Default::default()
        };
        assert_eq!(by_email.apply(&users)[0].username, "jdoe");

        let by_role = UserFilter {
            role: "ADMIN".into(),
            ..Default::default()
        };
        assert_eq!(by_role.apply(&users)[0].username, "asmith");

        let inactive = UserFilter {
            status: StatusFilter::Inactive,
            ..Default::default()
        };
        assert_eq!(inactive.apply(&users)[0].username, "asmith");

        assert_eq!(UserFilter::default().apply(&users).len(), 2);
    }

    #[test]
    fn test_role_is_exact() {
        let users = vec![user("a", "A", None, "SUPER_ADMIN", true)];
        let filter = UserFilter {
            role: "ADMIN".into(),
            ..Default::default()
        };
        assert!(filter.apply(&users).is_empty());
    }

    #[test]
    fn test_customer_filter() {
        let customers = vec![
            Customer {
                id: 1,
                name: "Acme Corp".into(),
                identifier_no: "AC-100".into(),
                customer_type: "COMPANY".into(),
                email: Some("ops@acme.test".into()),
                phone: None,
                address: None,
                active: true,
            },
            Customer {
                id: 2,
                name: "Jane Roe".into(),
                identifier_no: "P-200".into(),
                customer_type: "PERSON".into(),
                email: None,
                phone: Some("555-0100".into()),
                address: None,
                active: false,
            },
        ];

        let by_phone = CustomerFilter {
            phone: "0100".into(),
            ..Default::default()
        };
        assert_eq!(by_phone.apply(&customers)[0].id, 2);

        let by_type = CustomerFilter {
            customer_type: "COMPANY".into(),
            status: StatusFilter::Active,
            ..Default::default()
        };
        assert_eq!(by_type.apply(&customers)[0].id, 1);

        let by_identifier = CustomerFilter {
            identifier_no: "ac-".into(),
            ..Default::default()
        };
        assert_eq!(by_identifier.apply(&customers).len(), 1);
    }

    #[test]
    fn test_ticket_filter_defaults_to_open_statuses() {
        let tickets = vec![
            ticket("T-1", "BACKLOG", None),
            ticket("T-2", "DONE", None),
            ticket("T-3", "IN_PROGRESS", None),
        ];

        let filter = TicketFilter::default();
        let codes: Vec<&str> = filter.apply(&tickets).iter().map(|t| t.code.as_str()).collect();
        assert_eq!(codes, vec!["T-1", "T-3"]);

        let mut any = TicketFilter::default();
        any.statuses.clear();
        assert_eq!(any.apply(&tickets).len(), 3);

        any.code = "t-2".into();
        any.clear();
        assert_eq!(any, TicketFilter::default());
    }

    #[test]
    fn test_ticket_filter_dates_are_inclusive() {
        let tickets = vec![
            ticket("T-1", "TO_DO", Some("2025-01-10T08:00:00Z")),
            ticket("T-2", "TO_DO", Some("2025-01-20")),
            ticket("T-3", "TO_DO", None),
        ];

        let filter = TicketFilter {
            created_from: NaiveDate::from_ymd_opt(2025, 1, 10),
            created_to: NaiveDate::from_ymd_opt(2025, 1, 20),
            ..Default::default()
        };
        assert_eq!(filter.apply(&tickets).len(), 2);

        let narrow = TicketFilter {
            created_to: NaiveDate::from_ymd_opt(2025, 1, 15),
            ..Default::default()
        };
        let matched = narrow.apply(&tickets);
        assert_eq!(matched.len(), 1);
        assert_eq!(matched[0].code, "T-1");
    }

    #[test]
    fn test_ticket_filter_related_fields() {
        let tickets = vec![ticket("T-1", "TO_DO", None)];

        let by_assignee = TicketFilter {
            assignee: "JDO".into(),
            ..Default::default()
        };
        assert_eq!(by_assignee.apply(&tickets).len(), 1);

        let by_reporter = TicketFilter {
            reporter: "x".into(),
            ..Default::default()
        };
        assert!(by_reporter.apply(&tickets).is_empty());

        let by_customer = TicketFilter {
            request_by: "acme".into(),
            ..Default::default()
        };
        assert_eq!(by_customer.apply(&tickets).len(), 1);
    }
}
