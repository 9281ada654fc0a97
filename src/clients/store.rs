//! Client Storage

use crate::auth::models::Scope;
use crate::clients::models::{Client, ClientStatus};
use crate::db::{like_pattern, parse_timestamp, parse_uuid, search_text, Database};
use anyhow::{Context, Result};
use rusqlite::{params, OptionalExtension, Row};
use std::collections::HashMap;
use tracing::info;
use uuid::Uuid;

const CLIENT_COLUMNS: &str = "id, company_name, contact_name, contact_email, phone, industry, \
                              status, notes, owner_id, created_at, updated_at";

#[derive(Clone)]
pub struct ClientStore {
    db: Database,
}

impl ClientStore {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    pub fn create(&self, client: &Client) -> Result<()> {
        let conn = self.db.conn();
        conn.execute(
            &format!(
                "INSERT INTO clients ({}, search_text)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
                CLIENT_COLUMNS
            ),
            params![
                client.id.to_string(),
                client.company_name,
                client.contact_name,
                client.contact_email,
                client.phone,
                client.industry,
                client.status.as_str(),
                client.notes,
                client.owner_id.to_string(),
                client.created_at.to_rfc3339(),
                client.updated_at.to_rfc3339(),
                client_search_text(client),
            ],
        )
        .context("Failed to insert client")?;

        info!("Created client {} ({})", client.company_name, client.id);
        Ok(())
    }

    pub fn get(&self, id: &Uuid, scope: &Scope) -> Result<Option<Client>> {
        let conn = self.db.conn();
        conn.query_row(
            &format!(
                "SELECT {} FROM clients WHERE id = ?1 AND (?2 IS NULL OR owner_id = ?2)",
                CLIENT_COLUMNS
            ),
            params![id.to_string(), scope.owner()],
            client_from_row,
        )
        .optional()
        .context("Failed to load client")
    }

    /// Alphabetical by company, filtered by status and a search over
    /// company, contact and industry
    pub fn list(
        &self,
        scope: &Scope,
        status: Option<ClientStatus>,
        search: Option<&str>,
    ) -> Result<Vec<Client>> {
        let pattern = search
            .map(str::trim)
            .filter(|q| !q.is_empty())
            .map(like_pattern);

        let conn = self.db.conn();
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM clients
             WHERE (?1 IS NULL OR owner_id = ?1)
               AND (?2 IS NULL OR status = ?2)
               AND (?3 IS NULL OR search_text LIKE ?3 ESCAPE '\\')
             ORDER BY lower(company_name) ASC",
            CLIENT_COLUMNS
        ))?;

        let clients = stmt
            .query_map(
                params![scope.owner(), status.map(|s| s.as_str()), pattern],
                client_from_row,
            )?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(clients)
    }

    pub fn update(&self, client: &mut Client) -> Result<bool> {
        client.touch();

        let conn = self.db.conn();
        let rows_affected = conn
            .execute(
                "UPDATE clients
                 SET company_name = ?2, contact_name = ?3, contact_email = ?4, phone = ?5,
                     industry = ?6, status = ?7, notes = ?8, updated_at = ?9,
                     search_text = ?10
                 WHERE id = ?1",
                params![
                    client.id.to_string(),
                    client.company_name,
                    client.contact_name,
                    client.contact_email,
                    client.phone,
                    client.industry,
                    client.status.as_str(),
                    client.notes,
                    client.updated_at.to_rfc3339(),
                    client_search_text(client),
                ],
            )
            .context("Failed to update client")?;

        Ok(rows_affected > 0)
    }

    /// Delete a client and unlink any candidates that referenced it
    pub fn delete(&self, id: &Uuid, scope: &Scope) -> Result<bool> {
        let mut conn = self.db.conn();
        let tx = conn.transaction()?;

        let rows_affected = tx
            .execute(
                "DELETE FROM clients WHERE id = ?1 AND (?2 IS NULL OR owner_id = ?2)",
                params![id.to_string(), scope.owner()],
            )
            .context("Failed to delete client")?;

        if rows_affected > 0 {
            tx.execute(
                "UPDATE candidates SET client_id = NULL WHERE client_id = ?1",
                params![id.to_string()],
            )
            .context("Failed to unlink candidates")?;
        }
        tx.commit()?;

        if rows_affected > 0 {
            info!("Deleted client {}", id);
        }
        Ok(rows_affected > 0)
    }

    pub fn count_by_status(&self, scope: &Scope) -> Result<HashMap<ClientStatus, i64>> {
        let conn = self.db.conn();
        let mut stmt = conn.prepare(
            "SELECT status, COUNT(*) FROM clients
             WHERE (?1 IS NULL OR owner_id = ?1)
             GROUP BY status",
        )?;

        let rows = stmt
            .query_map(params![scope.owner()], |row| {
                Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?))
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(rows
            .into_iter()
            .filter_map(|(status, count)| ClientStatus::parse(&status).map(|s| (s, count)))
            .collect())
    }
}

fn client_search_text(client: &Client) -> String {
    search_text([
        client.company_name.as_str(),
        client.contact_name.as_str(),
        client.contact_email.as_str(),
        client.industry.as_deref().unwrap_or_default(),
    ])
}

fn client_from_row(row: &Row<'_>) -> rusqlite::Result<Client> {
    let status: String = row.get(6)?;

    Ok(Client {
        id: parse_uuid(0, row.get(0)?)?,
        company_name: row.get(1)?,
        contact_name: row.get(2)?,
        contact_email: row.get(3)?,
        phone: row.get(4)?,
        industry: row.get(5)?,
        status: ClientStatus::parse(&status).unwrap_or(ClientStatus::Prospect),
        notes: row.get(7)?,
        owner_id: parse_uuid(8, row.get(8)?)?,
        created_at: parse_timestamp(9, row.get(9)?)?,
        updated_at: parse_timestamp(10, row.get(10)?)?,
    })
}
