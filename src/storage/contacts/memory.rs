//! In-process contact repository with the same contracts as the PostgreSQL one.
//!
//! Ids start at 1 and are never reused, email uniqueness is checked on every
//! write, and listing is ordered by id.

use crate::domain::contact::now_utc;
use crate::domain::{
    Column, ColumnValue, Contact, ContactError, ContactInput, ContactPage, ContactResult,
    PageRequest, PatchPlan, ValidationError,
};
use crate::storage::contacts::ContactRepository;
use async_trait::async_trait;
use std::collections::BTreeMap;
use tokio::sync::RwLock;

#[derive(Default)]
struct Table {
    last_id: i64,
    rows: BTreeMap<i64, Contact>,
}

impl Table {
    fn email_taken(&self, email: &str, except: Option<i64>) -> bool {
        self.rows
            .values()
            .any(|c| c.email == email && Some(c.id) != except)
    }
}

#[derive(Default)]
pub struct InMemoryContactRepository {
    table: RwLock<Table>,
}

impl InMemoryContactRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.table.read().await.rows.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl ContactRepository for InMemoryContactRepository {
    async fn create(&self, input: &ContactInput) -> ContactResult<Contact> {
        let mut table = self.table.write().await;
        if table.email_taken(&input.email, None) {
            return Err(ContactError::DuplicateEmail);
        }

        table.last_id += 1;
        let now = now_utc();
        let contact = Contact {
            id: table.last_id,
            first_name: input.first_name.clone(),
            last_name: input.last_name.clone(),
            company: input.company.clone(),
            email: input.email.clone(),
            phone: input.phone.clone(),
            created_at: now,
            updated_at: now,
        };
        table.rows.insert(contact.id, contact.clone());
        Ok(contact)
    }

    async fn get_by_id(&self, id: i64) -> ContactResult<Contact> {
        self.table
            .read()
            .await
            .rows
            .get(&id)
            .cloned()
            .ok_or(ContactError::NotFound(id))
    }

    async fn list(&self, page: PageRequest) -> ContactResult<ContactPage> {
        let table = self.table.read().await;
        let skip = usize::try_from(page.offset()).unwrap_or(usize::MAX);
        let take = usize::try_from(page.page_size()).unwrap_or(0);
        let items = table.rows.values().skip(skip).take(take).cloned().collect();
        Ok(ContactPage {
            page: page.page(),
            page_size: page.page_size(),
            items,
        })
    }

    async fn update(&self, id: i64, input: &ContactInput) -> ContactResult<Contact> {
        let mut table = self.table.write().await;
        if !table.rows.contains_key(&id) {
            return Err(ContactError::NotFound(id));
        }
        if table.email_taken(&input.email, Some(id)) {
            return Err(ContactError::DuplicateEmail);
        }

        let row = table.rows.get_mut(&id).ok_or(ContactError::NotFound(id))?;
        row.first_name = input.first_name.clone();
        row.last_name = input.last_name.clone();
        row.company = input.company.clone();
        row.email = input.email.clone();
        row.phone = input.phone.clone();
        row.updated_at = now_utc();
        Ok(row.clone())
    }

    async fn patch(&self, plan: &PatchPlan) -> ContactResult<()> {
        if plan.assignments.is_empty() {
            return Err(ValidationError::EmptyPatch.into());
        }

        let mut table = self.table.write().await;
        if !table.rows.contains_key(&plan.id) {
            return Err(ContactError::NotFound(plan.id));
        }
        if let Some(ColumnValue::Text(email)) = plan.value_of(Column::Email) {
            if table.email_taken(email, Some(plan.id)) {
                return Err(ContactError::DuplicateEmail);
            }
        }

        let row = table
            .rows
            .get_mut(&plan.id)
            .ok_or(ContactError::NotFound(plan.id))?;
        for assignment in &plan.assignments {
            apply(row, assignment.column, &assignment.value)?;
        }
        Ok(())
    }

    async fn delete(&self, id: i64) -> ContactResult<()> {
        self.table
            .write()
            .await
            .rows
            .remove(&id)
            .map(|_| ())
            .ok_or(ContactError::NotFound(id))
    }

    async fn ping(&self) -> ContactResult<()> {
        Ok(())
    }
}

fn apply(row: &mut Contact, column: Column, value: &ColumnValue) -> ContactResult<()> {
    match (column, value) {
        (Column::FirstName, ColumnValue::Text(v)) => row.first_name = v.clone(),
        (Column::LastName, ColumnValue::Text(v)) => row.last_name = v.clone(),
        (Column::Email, ColumnValue::Text(v)) => row.email = v.clone(),
        (Column::Company, v) => row.company = nullable_text(v)?,
        (Column::Phone, v) => row.phone = nullable_text(v)?,
        (Column::UpdatedAt, ColumnValue::Timestamp(ts)) => row.updated_at = *ts,
        (column, value) => {
            return Err(ContactError::StorageUnavailable(format!(
                "cannot assign {value:?} to {}",
                column.as_sql()
            )))
        }
    }
    Ok(())
}

fn nullable_text(value: &ColumnValue) -> ContactResult<Option<String>> {
    match value {
        ColumnValue::Text(v) => Ok(Some(v.clone())),
        ColumnValue::Null => Ok(None),
        ColumnValue::Timestamp(_) => Err(ContactError::StorageUnavailable(
            "cannot assign a timestamp to a text column".to_string(),
        )),
    }
}
