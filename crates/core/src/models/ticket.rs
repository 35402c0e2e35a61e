//! Support tickets.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::entity::Table;
use crate::impl_entity;
use crate::types::{TicketId, TicketPriority, TicketStatus, UserId};

/// A support ticket opened by a customer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ticket {
    pub id: TicketId,
    pub user_id: UserId,
    pub subject: String,
    #[serde(default)]
    pub message: Option<String>,
    pub status: TicketStatus,
    pub priority: TicketPriority,
    #[serde(default)]
    pub assigned_to: Option<UserId>,
    pub created_at: DateTime<Utc>,
}

impl_entity!(Ticket, Table::Tickets);

/// Insert payload for a ticket.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewTicket {
    pub user_id: UserId,
    pub subject: String,
    pub message: Option<String>,
    #[serde(default)]
    pub status: TicketStatus,
    #[serde(default)]
    pub priority: TicketPriority,
}
