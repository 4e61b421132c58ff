//! Column resolver table
//!
//! Maps (entity, column, operator, value) to a leaf predicate fragment.
//! Resolution never fails: a column unknown to the entity, an operator
//! illegal for the column's semantic type, or an unparsable value all
//! degrade to no constraint. An unrecognized filter must never silently
//! exclude data; at worst it becomes a no-op.

use chrono::{DateTime, Utc};

use crate::utils::sql::escape_like_pattern;
use crate::utils::time::{end_of_day, format_instant, parse_date_value, start_of_day};

use super::placeholder::ResolvedValue;
use super::predicate::{CompiledPredicate, Leaf};
use super::types::{EntityKind, FilterValue, Operator};

/// Filterable columns across all entities
///
/// Parsed from the wire spelling; which entities a column applies to is
/// decided per family below.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Column {
    Status,
    Type,
    Title,
    DueDate,
    TourDate,
    BookingDate,
    CheckInDate,
    CheckOutDate,
    Responsible,
    QualityControl,
    RequestedBy,
    CreatedBy,
    BookedBy,
    Branch,
    Paid,
    Price,
    TotalPrice,
    GuestCount,
}

impl Column {
    fn parse(name: &str) -> Option<Self> {
        Some(match name {
            "status" => Self::Status,
            "type" => Self::Type,
            "title" => Self::Title,
            // "deadline" is the legacy spelling some stored filters carry
            "dueDate" | "deadline" => Self::DueDate,
            "tourDate" => Self::TourDate,
            "bookingDate" => Self::BookingDate,
            "checkInDate" => Self::CheckInDate,
            "checkOutDate" => Self::CheckOutDate,
            "responsible" => Self::Responsible,
            "qualityControl" => Self::QualityControl,
            "requestedBy" => Self::RequestedBy,
            "createdBy" => Self::CreatedBy,
            "bookedBy" => Self::BookedBy,
            "branch" => Self::Branch,
            "paid" => Self::Paid,
            "price" => Self::Price,
            "totalPrice" => Self::TotalPrice,
            "guestCount" => Self::GuestCount,
            _ => return None,
        })
    }
}

/// Resolve one condition to a leaf predicate (or no constraint)
pub(crate) fn resolve(
    entity: EntityKind,
    column: &str,
    operator: Operator,
    value: &ResolvedValue,
) -> CompiledPredicate {
    let Some(column) = Column::parse(column) else {
        tracing::debug!(column, ?entity, "Unknown filter column, dropping condition");
        return CompiledPredicate::Empty;
    };

    match column {
        Column::Status => enumeration("status", operator, value),
        Column::Type => match entity {
            EntityKind::Request | EntityKind::Task => enumeration("type", operator, value),
            _ => CompiledPredicate::Empty,
        },
        Column::Title => text("title", operator, value),
        Column::DueDate => match entity {
            EntityKind::Task | EntityKind::Request => date("due_date", operator, value),
            _ => CompiledPredicate::Empty,
        },
        Column::TourDate => match entity {
            EntityKind::Tour => date("tour_date", operator, value),
            _ => CompiledPredicate::Empty,
        },
        Column::BookingDate => match entity {
            EntityKind::TourBooking => date("booking_date", operator, value),
            _ => CompiledPredicate::Empty,
        },
        Column::CheckInDate => match entity {
            EntityKind::Reservation => date("check_in_date", operator, value),
            _ => CompiledPredicate::Empty,
        },
        Column::CheckOutDate => match entity {
            EntityKind::Reservation => date("check_out_date", operator, value),
            _ => CompiledPredicate::Empty,
        },
        Column::Responsible
        | Column::QualityControl
        | Column::RequestedBy
        | Column::CreatedBy
        | Column::BookedBy => identity(entity, column, operator, value),
        Column::Branch => branch(operator, value),
        Column::Paid => match entity {
            EntityKind::TourBooking | EntityKind::Reservation => {
                boolean("paid", operator, value)
            }
            _ => CompiledPredicate::Empty,
        },
        Column::Price => match entity {
            EntityKind::Tour => numeric("price", operator, value),
            _ => CompiledPredicate::Empty,
        },
        Column::TotalPrice => match entity {
            EntityKind::TourBooking => numeric("total_price", operator, value),
            _ => CompiledPredicate::Empty,
        },
        Column::GuestCount => match entity {
            EntityKind::Reservation => numeric("guest_count", operator, value),
            _ => CompiledPredicate::Empty,
        },
    }
}

fn plain_text(value: &ResolvedValue) -> Option<&str> {
    match value {
        ResolvedValue::Plain(FilterValue::Text(s)) => Some(s),
        _ => None,
    }
}

/// Status/enumeration columns: identity match only
fn enumeration(field: &str, operator: Operator, value: &ResolvedValue) -> CompiledPredicate {
    let Some(text) = plain_text(value) else {
        return CompiledPredicate::Empty;
    };
    match operator {
        Operator::Equals => Leaf::ordinary(format!("{} = ?", field), vec![text.to_string()]),
        Operator::NotEquals => Leaf::ordinary(format!("{} <> ?", field), vec![text.to_string()]),
        _ => CompiledPredicate::Empty,
    }
}

/// Text columns: case-insensitive exact and pattern matches
fn text(field: &str, operator: Operator, value: &ResolvedValue) -> CompiledPredicate {
    let Some(text) = plain_text(value) else {
        return CompiledPredicate::Empty;
    };
    let like = |pattern: String| {
        Leaf::ordinary(format!("{} ILIKE ? ESCAPE '\\'", field), vec![pattern])
    };
    match operator {
        Operator::Equals => Leaf::ordinary(
            format!("LOWER({}) = LOWER(?)", field),
            vec![text.to_string()],
        ),
        Operator::Contains => like(format!("%{}%", escape_like_pattern(text))),
        Operator::StartsWith => like(format!("{}%", escape_like_pattern(text))),
        Operator::EndsWith => like(format!("%{}", escape_like_pattern(text))),
        _ => CompiledPredicate::Empty,
    }
}

fn date_instant(value: &ResolvedValue) -> Option<DateTime<Utc>> {
    match value {
        ResolvedValue::Instant(instant) => Some(*instant),
        ResolvedValue::Plain(FilterValue::Text(s)) => parse_date_value(s),
        // Numeric date values are epoch milliseconds
        ResolvedValue::Plain(FilterValue::Number(n)) => {
            DateTime::from_timestamp_millis(*n as i64)
        }
        _ => None,
    }
}

/// Date columns: `equals` covers the full calendar day of the value,
/// `before`/`after` are strict inequalities against the instant
fn date(field: &str, operator: Operator, value: &ResolvedValue) -> CompiledPredicate {
    let Some(instant) = date_instant(value) else {
        return CompiledPredicate::Empty;
    };
    match operator {
        Operator::Equals => Leaf::ordinary(
            format!("({} >= ? AND {} <= ?)", field, field),
            vec![
                format_instant(start_of_day(instant)),
                format_instant(end_of_day(instant)),
            ],
        ),
        Operator::Before => Leaf::ordinary(
            format!("{} < ?", field),
            vec![format_instant(instant)],
        ),
        Operator::After => Leaf::ordinary(
            format!("{} > ?", field),
            vec![format_instant(instant)],
        ),
        _ => CompiledPredicate::Empty,
    }
}

fn identity_match(field: &str, operator: Operator, id: i64) -> CompiledPredicate {
    match operator {
        Operator::Equals => Leaf::ordinary(format!("{} = ?", field), vec![id.to_string()]),
        Operator::NotEquals => Leaf::ordinary(format!("{} <> ?", field), vec![id.to_string()]),
        _ => CompiledPredicate::Empty,
    }
}

/// Identity-reference columns: value is a `user-<id>` or `role-<id>`
/// tagged reference; only a subset of (column, entity) pairs is legal
fn identity(
    entity: EntityKind,
    column: Column,
    operator: Operator,
    value: &ResolvedValue,
) -> CompiledPredicate {
    let Some(text) = plain_text(value) else {
        return CompiledPredicate::Empty;
    };

    if let Some(id) = text.strip_prefix("user-").and_then(|s| s.parse::<i64>().ok()) {
        let field = match (column, entity) {
            (Column::Responsible, EntityKind::Task | EntityKind::Request) => "responsible_id",
            (Column::QualityControl, EntityKind::Task) => "quality_control_id",
            (Column::RequestedBy, EntityKind::Request) => "requester_id",
            (Column::CreatedBy, EntityKind::Tour) => "created_by_id",
            (Column::BookedBy, EntityKind::TourBooking) => "booked_by_id",
            _ => return CompiledPredicate::Empty,
        };
        return identity_match(field, operator, id);
    }

    if let Some(id) = text.strip_prefix("role-").and_then(|s| s.parse::<i64>().ok()) {
        // Only tasks carry a role assignment
        return match (column, entity) {
            (Column::Responsible, EntityKind::Task) => identity_match("role_id", operator, id),
            _ => CompiledPredicate::Empty,
        };
    }

    CompiledPredicate::Empty
}

/// Branch column: literal name match or the resolved current-branch id.
/// Both forms constrain on branch identity and are isolation-sensitive.
fn branch(operator: Operator, value: &ResolvedValue) -> CompiledPredicate {
    match value {
        ResolvedValue::CurrentBranch(branch_id) => match operator {
            Operator::Equals => {
                Leaf::isolation_sensitive("branch_id = ?", vec![branch_id.to_string()])
            }
            _ => CompiledPredicate::Empty,
        },
        ResolvedValue::Plain(FilterValue::Text(name)) => match operator {
            Operator::Equals => Leaf::isolation_sensitive(
                "LOWER(branch.name) = LOWER(?)",
                vec![name.to_string()],
            ),
            Operator::Contains => Leaf::isolation_sensitive(
                "branch.name ILIKE ? ESCAPE '\\'",
                vec![format!("%{}%", escape_like_pattern(name))],
            ),
            _ => CompiledPredicate::Empty,
        },
        _ => CompiledPredicate::Empty,
    }
}

/// Boolean columns: "true"/"1"/1/true coerce to true, anything else to false
fn boolean(field: &str, operator: Operator, value: &ResolvedValue) -> CompiledPredicate {
    let truthy = match value {
        ResolvedValue::Plain(FilterValue::Bool(b)) => *b,
        ResolvedValue::Plain(FilterValue::Number(n)) => *n == 1.0,
        ResolvedValue::Plain(FilterValue::Text(t)) => t == "true" || t == "1",
        _ => false,
    };
    let sql_bool = if truthy { "TRUE" } else { "FALSE" };
    match operator {
        Operator::Equals => Leaf::ordinary(format!("{} = {}", field, sql_bool), vec![]),
        Operator::NotEquals => Leaf::ordinary(format!("{} <> {}", field, sql_bool), vec![]),
        _ => CompiledPredicate::Empty,
    }
}

/// Numeric columns: equals and strict comparisons
fn numeric(field: &str, operator: Operator, value: &ResolvedValue) -> CompiledPredicate {
    let number = match value {
        ResolvedValue::Plain(FilterValue::Number(n)) => *n,
        ResolvedValue::Plain(FilterValue::Text(t)) => match t.parse::<f64>() {
            Ok(n) => n,
            Err(_) => return CompiledPredicate::Empty,
        },
        _ => return CompiledPredicate::Empty,
    };
    let op = match operator {
        Operator::Equals => "=",
        Operator::GreaterThan => ">",
        Operator::LessThan => "<",
        _ => return CompiledPredicate::Empty,
    };
    Leaf::ordinary(format!("{} {} ?", field, op), vec![number.to_string()])
}
