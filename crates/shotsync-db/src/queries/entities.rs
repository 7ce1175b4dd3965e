//! Entity queries.
//!
//! Records are stored as a JSON object of their fields. The `code` column
//! mirrors the `code` field so natural-key lookups hit an index; every other
//! filter is evaluated on the decoded record.

use chrono::Utc;
use rusqlite::{Connection, Row};
use shotsync_common::{
    FieldValue, Record, Relation, ScopeFilter, StoreError, CODE_FIELD, ID_FIELD, TYPE_FIELD,
};

/// Insert a new entity and return it with its assigned `id` and `type`.
///
/// `id` and `type` entries in `data` are ignored; the store owns both.
pub fn insert_entity(
    conn: &Connection,
    entity_type: &str,
    data: &Record,
) -> Result<Record, StoreError> {
    let fields: Record = data
        .fields()
        .filter(|(k, _)| *k != ID_FIELD && *k != TYPE_FIELD)
        .map(|(k, v)| (k.to_string(), v.clone()))
        .collect();
    let fields_json =
        serde_json::to_string(&fields).map_err(|e| StoreError::decode(e.to_string()))?;
    let created_at = Utc::now();

    conn.execute(
        "INSERT INTO entities (entity_type, code, fields, created_at)
         VALUES (:entity_type, :code, :fields, :created_at)",
        rusqlite::named_params! {
            ":entity_type": entity_type,
            ":code": fields.code(),
            ":fields": fields_json,
            ":created_at": created_at.to_rfc3339(),
        },
    )
    .map_err(|e| StoreError::database(e.to_string()))?;

    let id = conn.last_insert_rowid();
    Ok(fields.with(TYPE_FIELD, entity_type).with(ID_FIELD, id))
}

/// Find entities of `entity_type` matching every filter.
///
/// Results are ordered by id and projected onto `fields` (plus `id` and
/// `type`); an empty `fields` returns every stored field.
pub fn find_entities(
    conn: &Connection,
    entity_type: &str,
    filters: &[ScopeFilter],
    fields: &[String],
) -> Result<Vec<Record>, StoreError> {
    let candidates = match code_constraint(filters) {
        Some(code) => select(
            conn,
            "SELECT id, entity_type, fields FROM entities
             WHERE entity_type = ?1 AND code = ?2 ORDER BY id",
            rusqlite::params![entity_type, code],
        )?,
        None => select(
            conn,
            "SELECT id, entity_type, fields FROM entities
             WHERE entity_type = ?1 ORDER BY id",
            rusqlite::params![entity_type],
        )?,
    };

    Ok(candidates
        .into_iter()
        .filter(|record| filters.iter().all(|f| f.matches(record)))
        .map(|record| record.project(fields))
        .collect())
}

/// Count the stored entities of `entity_type`.
pub fn count_entities(conn: &Connection, entity_type: &str) -> Result<i64, StoreError> {
    conn.query_row(
        "SELECT COUNT(*) FROM entities WHERE entity_type = ?",
        [entity_type],
        |row| row.get(0),
    )
    .map_err(|e| StoreError::database(e.to_string()))
}

/// Text value of the first `code is <text>` filter, used to narrow the scan.
fn code_constraint(filters: &[ScopeFilter]) -> Option<&str> {
    filters
        .iter()
        .find(|f| f.field == CODE_FIELD && f.relation == Relation::Is)
        .and_then(|f| f.value.as_str())
}

fn select<P: rusqlite::Params>(
    conn: &Connection,
    sql: &str,
    params: P,
) -> Result<Vec<Record>, StoreError> {
    let mut stmt = conn
        .prepare(sql)
        .map_err(|e| StoreError::database(e.to_string()))?;

    let rows = stmt
        .query_map(params, row_to_record)
        .map_err(|e| StoreError::database(e.to_string()))?
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(|e| StoreError::database(e.to_string()))?;

    rows.into_iter().collect()
}

fn row_to_record(row: &Row<'_>) -> rusqlite::Result<Result<Record, StoreError>> {
    let id: i64 = row.get(0)?;
    let entity_type: String = row.get(1)?;
    let fields_json: String = row.get(2)?;

    Ok(serde_json::from_str::<Record>(&fields_json)
        .map(|fields| {
            fields
                .with(TYPE_FIELD, FieldValue::Text(entity_type))
                .with(ID_FIELD, id)
        })
        .map_err(|e| StoreError::decode(format!("entity {id} has invalid fields: {e}"))))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{get_conn, init_memory_pool};
    use rusqlite::OptionalExtension;
    use shotsync_common::{EntityId, EntityRef};

    fn setup() -> crate::pool::PooledConnection {
        let pool = init_memory_pool().unwrap();
        get_conn(&pool).unwrap()
    }

    fn get_entity(conn: &Connection, id: EntityId) -> Result<Option<Record>, StoreError> {
        conn.query_row(
            "SELECT id, entity_type, fields FROM entities WHERE id = :id",
            rusqlite::named_params! { ":id": id.get() },
            row_to_record,
        )
        .optional()
        .map_err(|e| StoreError::database(e.to_string()))?
        .transpose()
    }

    #[test]
    fn test_insert_assigns_identity() {
        let conn = setup();
        let data = Record::new()
            .with("code", "SH010")
            .with("id", 999)
            .with("type", "Bogus");

        let shot = insert_entity(&conn, "Shot", &data).unwrap();
        assert_eq!(shot.entity_type(), Some("Shot"));
        assert_ne!(shot.id(), Some(EntityId::new(999)));
        assert_eq!(shot.code(), Some("SH010"));

        let stored = get_entity(&conn, shot.id().unwrap()).unwrap().unwrap();
        assert_eq!(stored, shot);
    }

    #[test]
    fn test_get_missing_entity() {
        let conn = setup();
        assert!(get_entity(&conn, EntityId::new(42)).unwrap().is_none());
    }

    #[test]
    fn test_find_by_code_and_link() {
        let conn = setup();
        let seq_a = EntityRef::new("Sequence", 1);
        let seq_b = EntityRef::new("Sequence", 2);
        let shot = |seq: &EntityRef| {
            Record::new()
                .with("code", "SH010")
                .with("sg_sequence", seq.clone())
        };
        insert_entity(&conn, "Shot", &shot(&seq_a)).unwrap();
        insert_entity(&conn, "Shot", &shot(&seq_b)).unwrap();
        insert_entity(&conn, "Asset", &Record::new().with("code", "SH010")).unwrap();

        let found = find_entities(
            &conn,
            "Shot",
            &[
                ScopeFilter::is("sg_sequence", seq_a),
                ScopeFilter::is("code", "SH010"),
            ],
            &[],
        )
        .unwrap();
        assert_eq!(found.len(), 1);

        let all = find_entities(&conn, "Shot", &[ScopeFilter::is("code", "SH010")], &[]).unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(count_entities(&conn, "Shot").unwrap(), 2);
    }

    #[test]
    fn test_find_without_code_filter() {
        let conn = setup();
        for (code, status) in [("FER_101", "ip"), ("FER_102", "omt")] {
            let data = Record::new().with("code", code).with("sg_status_list", status);
            insert_entity(&conn, "Episode", &data).unwrap();
        }

        let active = find_entities(
            &conn,
            "Episode",
            &[ScopeFilter::is_not("sg_status_list", "omt")],
            &[],
        )
        .unwrap();
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].code(), Some("FER_101"));
    }

    #[test]
    fn test_find_projects_fields() {
        let conn = setup();
        insert_entity(
            &conn,
            "Shot",
            &Record::new()
                .with("code", "SH010")
                .with("sg_cut_in", 1001)
                .with("description", "hero"),
        )
        .unwrap();

        let found = find_entities(
            &conn,
            "Shot",
            &[ScopeFilter::is("code", "SH010")],
            &["sg_cut_in".to_string()],
        )
        .unwrap();
        assert_eq!(found[0].get_string("sg_cut_in"), "1001");
        assert!(!found[0].contains("description"));
        assert!(found[0].id().is_some());
    }
}
