//! Candidate Storage
//! Mission: Owner-scoped persistence of the recruiting pipeline

use crate::auth::models::Scope;
use crate::candidates::models::{Candidate, CandidateStatus};
use crate::db::{like_pattern, parse_timestamp, parse_uuid, search_text, Database};
use anyhow::{Context, Result};
use rusqlite::{params, OptionalExtension, Row};
use std::collections::HashMap;
use tracing::info;
use uuid::Uuid;

const CANDIDATE_COLUMNS: &str = "id, name, email, phone, position, status, skills, notes, \
                                 client_id, owner_id, created_at, updated_at";

#[derive(Clone)]
pub struct CandidateStore {
    db: Database,
}

impl CandidateStore {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    pub fn create(&self, candidate: &Candidate) -> Result<()> {
        let skills = serde_json::to_string(&candidate.skills)?;
        let conn = self.db.conn();
        conn.execute(
            &format!(
                "INSERT INTO candidates ({}, search_text)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)",
                CANDIDATE_COLUMNS
            ),
            params![
                candidate.id.to_string(),
                candidate.name,
                candidate.email,
                candidate.phone,
                candidate.position,
                candidate.status.as_str(),
                skills,
                candidate.notes,
                candidate.client_id.map(|id| id.to_string()),
                candidate.owner_id.to_string(),
                candidate.created_at.to_rfc3339(),
                candidate.updated_at.to_rfc3339(),
                candidate_search_text(candidate),
            ],
        )
        .context("Failed to insert candidate")?;

        info!("Created candidate {} for owner {}", candidate.id, candidate.owner_id);
        Ok(())
    }

    /// Fetch one candidate if it is visible within `scope`
    pub fn get(&self, id: &Uuid, scope: &Scope) -> Result<Option<Candidate>> {
        let conn = self.db.conn();
        conn.query_row(
            &format!(
                "SELECT {} FROM candidates WHERE id = ?1 AND (?2 IS NULL OR owner_id = ?2)",
                CANDIDATE_COLUMNS
            ),
            params![id.to_string(), scope.owner()],
            candidate_from_row,
        )
        .optional()
        .context("Failed to load candidate")
    }

    /// Newest first, filtered by status and a free-text search over
    /// name, email, position and skills
    pub fn list(
        &self,
        scope: &Scope,
        status: Option<CandidateStatus>,
        search: Option<&str>,
    ) -> Result<Vec<Candidate>> {
        let pattern = search
            .map(str::trim)
            .filter(|q| !q.is_empty())
            .map(like_pattern);

        let conn = self.db.conn();
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM candidates
             WHERE (?1 IS NULL OR owner_id = ?1)
               AND (?2 IS NULL OR status = ?2)
               AND (?3 IS NULL OR search_text LIKE ?3 ESCAPE '\\')
             ORDER BY created_at DESC",
            CANDIDATE_COLUMNS
        ))?;

        let candidates = stmt
            .query_map(
                params![scope.owner(), status.map(|s| s.as_str()), pattern],
                candidate_from_row,
            )?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(candidates)
    }

    /// Persist every mutable field, refreshing `updated_at` first
    pub fn update(&self, candidate: &mut Candidate) -> Result<bool> {
        candidate.touch();
        let skills = serde_json::to_string(&candidate.skills)?;

        let conn = self.db.conn();
        let rows_affected = conn
            .execute(
                "UPDATE candidates
                 SET name = ?2, email = ?3, phone = ?4, position = ?5, status = ?6,
                     skills = ?7, notes = ?8, client_id = ?9, updated_at = ?10,
                     search_text = ?11
                 WHERE id = ?1",
                params![
                    candidate.id.to_string(),
                    candidate.name,
                    candidate.email,
                    candidate.phone,
                    candidate.position,
                    candidate.status.as_str(),
                    skills,
                    candidate.notes,
                    candidate.client_id.map(|id| id.to_string()),
                    candidate.updated_at.to_rfc3339(),
                    candidate_search_text(candidate),
                ],
            )
            .context("Failed to update candidate")?;

        Ok(rows_affected > 0)
    }

    pub fn delete(&self, id: &Uuid, scope: &Scope) -> Result<bool> {
        let conn = self.db.conn();
        let rows_affected = conn
            .execute(
                "DELETE FROM candidates WHERE id = ?1 AND (?2 IS NULL OR owner_id = ?2)",
                params![id.to_string(), scope.owner()],
            )
            .context("Failed to delete candidate")?;

        if rows_affected > 0 {
            info!("Deleted candidate {}", id);
        }
        Ok(rows_affected > 0)
    }

    /// Candidate count per pipeline stage within `scope`
    pub fn count_by_status(&self, scope: &Scope) -> Result<HashMap<CandidateStatus, i64>> {
        let conn = self.db.conn();
        let mut stmt = conn.prepare(
            "SELECT status, COUNT(*) FROM candidates
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
            .filter_map(|(status, count)| CandidateStatus::parse(&status).map(|s| (s, count)))
            .collect())
    }
}

fn candidate_search_text(candidate: &Candidate) -> String {
    search_text(
        [
            candidate.name.as_str(),
            candidate.email.as_str(),
            candidate.position.as_str(),
        ]
        .into_iter()
        .chain(candidate.skills.iter().map(String::as_str)),
    )
}

fn candidate_from_row(row: &Row<'_>) -> rusqlite::Result<Candidate> {
    let status: String = row.get(5)?;
    let skills: String = row.get(6)?;
    let client_id: Option<String> = row.get(8)?;

    Ok(Candidate {
        id: parse_uuid(0, row.get(0)?)?,
        name: row.get(1)?,
        email: row.get(2)?,
        phone: row.get(3)?,
        position: row.get(4)?,
        status: CandidateStatus::parse(&status).unwrap_or(CandidateStatus::New),
        skills: serde_json::from_str(&skills).unwrap_or_default(),
        notes: row.get(7)?,
        client_id: client_id.map(|id| parse_uuid(8, id)).transpose()?,
        owner_id: parse_uuid(9, row.get(9)?)?,
        created_at: parse_timestamp(10, row.get(10)?)?,
        updated_at: parse_timestamp(11, row.get(11)?)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn candidate(owner: Uuid, name: &str, status: CandidateStatus) -> Candidate {
        let now = Utc::now();
        Candidate {
            id: Uuid::new_v4(),
            name: name.to_string(),
            email: format!("{}@example.com", name.to_lowercase()),
            phone: None,
            position: "Backend Engineer".to_string(),
            status,
            skills: vec!["Rust".to_string(), "PostgreSQL".to_string()],
            notes: None,
            client_id: None,
            owner_id: owner,
            created_at: now,
            updated_at: now,
        }
    }

    fn store() -> CandidateStore {
        CandidateStore::new(Database::in_memory().unwrap())
    }

    #[test]
    fn test_create_and_get_scoped() {
        let store = store();
        let alice = Uuid::new_v4();
        let bob = Uuid::new_v4();

        let c = candidate(alice, "Ada", CandidateStatus::New);
        store.create(&c).unwrap();

        let loaded = store
            .get(&c.id, &Scope::Owner(alice.to_string()))
            .unwrap()
            .unwrap();
        assert_eq!(loaded.name, "Ada");
        assert_eq!(loaded.skills, vec!["Rust", "PostgreSQL"]);

        assert!(store.get(&c.id, &Scope::Owner(bob.to_string())).unwrap().is_none());
        assert!(store.get(&c.id, &Scope::All).unwrap().is_some());
    }

    #[test]
    fn test_list_filters() {
        let store = store();
        let alice = Uuid::new_v4();
        let bob = Uuid::new_v4();

        store.create(&candidate(alice, "Ada", CandidateStatus::New)).unwrap();
        store.create(&candidate(alice, "Grace", CandidateStatus::Interview)).unwrap();
        store.create(&candidate(bob, "Linus", CandidateStatus::Interview)).unwrap();

        let mine = store.list(&Scope::Owner(alice.to_string()), None, None).unwrap();
        assert_eq!(mine.len(), 2);

        let all_interviews = store
            .list(&Scope::All, Some(CandidateStatus::Interview), None)
            .unwrap();
        assert_eq!(all_interviews.len(), 2);

        let search = store.list(&Scope::All, None, Some("GRA")).unwrap();
        assert_eq!(search.len(), 1);
        assert_eq!(search[0].name, "Grace");

        let by_skill = store.list(&Scope::All, None, Some("postgres")).unwrap();
        assert_eq!(by_skill.len(), 3);

        let wildcard = store.list(&Scope::All, None, Some("%")).unwrap();
        assert!(wildcard.is_empty());
    }

    #[test]
    fn test_search_matches_accented_names() {
        let store = store();
        let owner = Uuid::new_v4();
        let mut c = candidate(owner, "Émile", CandidateStatus::New);
        c.name = "Émile Zola".to_string();
        store.create(&c).unwrap();

        for query in ["Émile", "émile", "ÉMILE ZOLA"] {
            let hits = store.list(&Scope::All, None, Some(query)).unwrap();
            assert_eq!(hits.len(), 1, "query {:?}", query);
        }

        c.name = "Ærøskøbing Ølstad".to_string();
        c.email = "olstad@example.com".to_string();
        store.update(&mut c).unwrap();
        assert_eq!(store.list(&Scope::All, None, Some("ølstad")).unwrap().len(), 1);
        assert!(store.list(&Scope::All, None, Some("émile")).unwrap().is_empty());
    }

    #[test]
    fn test_update_and_delete() {
        let store = store();
        let owner = Uuid::new_v4();
        let mut c = candidate(owner, "Ada", CandidateStatus::New);
        store.create(&c).unwrap();
        let before = c.updated_at;

        std::thread::sleep(std::time::Duration::from_millis(5));
        c.status = CandidateStatus::Offer;
        assert!(store.update(&mut c).unwrap());

        let loaded = store.get(&c.id, &Scope::All).unwrap().unwrap();
        assert_eq!(loaded.status, CandidateStatus::Offer);
        assert!(loaded.updated_at > before);

        assert!(!store.delete(&c.id, &Scope::Owner(Uuid::new_v4().to_string())).unwrap());
        assert!(store.delete(&c.id, &Scope::Owner(owner.to_string())).unwrap());
        assert!(store.get(&c.id, &Scope::All).unwrap().is_none());
    }

    #[test]
    fn test_count_by_status() {
        let store = store();
        let alice = Uuid::new_v4();
        let bob = Uuid::new_v4();

        store.create(&candidate(alice, "A", CandidateStatus::New)).unwrap();
        store.create(&candidate(alice, "B", CandidateStatus::New)).unwrap();
        store.create(&candidate(bob, "C", CandidateStatus::Hired)).unwrap();

        let all = store.count_by_status(&Scope::All).unwrap();
        assert_eq!(all.get(&CandidateStatus::New), Some(&2));
        assert_eq!(all.get(&CandidateStatus::Hired), Some(&1));

        let bobs = store.count_by_status(&Scope::Owner(bob.to_string())).unwrap();
        assert_eq!(bobs.get(&CandidateStatus::New), None);
        assert_eq!(bobs.get(&CandidateStatus::Hired), Some(&1));
    }
}
