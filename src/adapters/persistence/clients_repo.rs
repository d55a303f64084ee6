//! ClientRepo over SQLite: clients and their addresses.

use super::filter::SqlFilter;
use super::rows::{self, Record, SqlValue, now, repo_err};
use super::sqlite_repo::{SqliteRepo, begin_write, execute, find_in, insert_in, query_all};
use crate::domain::dto::{
    AddressInput, AddressPatch, AddressReassignment, ClientPatch, NewAddress, NewClient,
    PrimaryAddress,
};
use crate::domain::{
    Address, Client, ClientDetail, DomainError, EntityId, ListQuery, Page, PageRequest,
};
use crate::ports::ClientRepo;
use libsql::{Connection, Row, Value};
use tracing::info;

const CLIENT_SEARCH_COLUMNS: &[&str] = &["name", "email", "phone", "company"];
const ADDRESS_SEARCH_COLUMNS: &[&str] = &["label", "street", "city", "postal_code", "country"];

const INSERT_ADDRESS: &str = r#"
    INSERT INTO addresses (client_id, label, street, city, postal_code, country, is_primary,
        created_at, updated_at)
    VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?8)
"#;

impl Record for Client {
    const ENTITY: &'static str = "client";
    const TABLE: &'static str = "clients";
    const COLUMNS: &'static str = "id, name, email, phone, company, notes, created_at, updated_at";

    fn from_row(row: &Row) -> Result<Self, DomainError> {
        Ok(Self {
            id: rows::id(row, 0)?,
            name: rows::text(row, 1)?,
            email: rows::opt_text(row, 2)?,
            phone: rows::opt_text(row, 3)?,
            company: rows::opt_text(row, 4)?,
            notes: rows::opt_text(row, 5)?,
            created_at: rows::timestamp(row, 6)?,
            updated_at: rows::timestamp(row, 7)?,
        })
    }
}

impl Record for Address {
    const ENTITY: &'static str = "address";
    const TABLE: &'static str = "addresses";
    const COLUMNS: &'static str = "id, client_id, label, street, city, postal_code, country, \
        is_primary, created_at, updated_at";

    fn from_row(row: &Row) -> Result<Self, DomainError> {
        Ok(Self {
            id: rows::id(row, 0)?,
            client_id: rows::id(row, 1)?,
            label: rows::opt_text(row, 2)?,
            street: rows::text(row, 3)?,
            city: rows::text(row, 4)?,
            postal_code: rows::opt_text(row, 5)?,
            country: rows::opt_text(row, 6)?,
            is_primary: rows::boolean(row, 7)?,
            created_at: rows::timestamp(row, 8)?,
            updated_at: rows::timestamp(row, 9)?,
        })
    }
}

fn address_params(client_id: EntityId, input: &AddressInput) -> Vec<Value> {
    vec![
        client_id.sql(),
        input.label.sql(),
        input.street.sql(),
        input.city.sql(),
        input.postal_code.sql(),
        input.country.sql(),
        input.is_primary.sql(),
        now(),
    ]
}

async fn addresses_of(conn: &Connection, client_id: EntityId) -> Result<Vec<Address>, DomainError> {
    query_all::<Address>(
        conn,
        &format!(
            "SELECT {} FROM addresses WHERE client_id = ?1 ORDER BY is_primary DESC, id",
            Address::COLUMNS
        ),
        vec![client_id.sql()],
    )
    .await
}

async fn clear_primary(conn: &Connection, client_id: EntityId) -> Result<(), DomainError> {
    execute(
        conn,
        "UPDATE addresses SET is_primary = 0, updated_at = ?2 \
            WHERE client_id = ?1 AND is_primary = 1",
        vec![client_id.sql(), now()],
    )
    .await?;
    Ok(())
}

async fn touch_client(conn: &Connection, client_id: EntityId) -> Result<u64, DomainError> {
    execute(
        conn,
        "UPDATE clients SET updated_at = ?2 WHERE id = ?1",
        vec![client_id.sql(), now()],
    )
    .await
}

#[async_trait::async_trait]
impl ClientRepo for SqliteRepo {
    async fn list_clients(
        &self,
        query: &ListQuery,
        page: PageRequest,
    ) -> Result<Page<Client>, DomainError> {
        let mut filter = SqlFilter::new();
        filter.search(CLIENT_SEARCH_COLUMNS, query.search_term());
        self.list_page(&filter, "id", page).await
    }

    async fn get_client(&self, id: EntityId) -> Result<Option<ClientDetail>, DomainError> {
        let conn = self.conn().await?;
        let Some(client) = find_in::<Client>(&conn, id).await? else {
            return Ok(None);
        };
        let addresses = addresses_of(&conn, id).await?;
        Ok(Some(ClientDetail { client, addresses }))
    }

    async fn create_client(&self, dto: &NewClient) -> Result<ClientDetail, DomainError> {
        let conn = self.conn().await?;
        let tx = begin_write(&conn).await?;
        let client = insert_in::<Client>(
            &tx,
            r#"
            INSERT INTO clients (name, email, phone, company, notes, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?6)
            "#,
            vec![
                dto.name.sql(),
                dto.email.sql(),
                dto.phone.sql(),
                dto.company.sql(),
                dto.notes.sql(),
                now(),
            ],
        )
        .await?;
        for input in &dto.addresses {
            execute(&tx, INSERT_ADDRESS, address_params(client.id, input)).await?;
        }
        let addresses = addresses_of(&tx, client.id).await?;
        tx.commit().await.map_err(repo_err)?;

        info!(client_id = client.id, addresses = addresses.len(), "client created");
        Ok(ClientDetail { client, addresses })
    }

    async fn update_client(&self, patch: &ClientPatch) -> Result<Option<Client>, DomainError> {
        self.update_row(
            r#"
            UPDATE clients SET
                name = COALESCE(?2, name),
                email = COALESCE(?3, email),
                phone = COALESCE(?4, phone),
                company = COALESCE(?5, company),
                notes = COALESCE(?6, notes),
                updated_at = ?7
            WHERE id = ?1
            "#,
            vec![
                patch.id.sql(),
                patch.name.sql(),
                patch.email.sql(),
                patch.phone.sql(),
                patch.company.sql(),
                patch.notes.sql(),
                now(),
            ],
            patch.id,
        )
        .await
    }

    async fn delete_client(&self, id: EntityId) -> Result<bool, DomainError> {
        self.delete_row::<Client>(id).await
    }

    async fn list_addresses(
        &self,
        query: &ListQuery,
        page: PageRequest,
    ) -> Result<Page<Address>, DomainError> {
        let mut filter = SqlFilter::new();
        filter
            .eq("client_id", query.client_id)
            .search(ADDRESS_SEARCH_COLUMNS, query.search_term());
        self.list_page(&filter, "id", page).await
    }

    async fn get_address(&self, id: EntityId) -> Result<Option<Address>, DomainError> {
        self.find(id).await
    }

    async fn create_address(&self, dto: &NewAddress) -> Result<Address, DomainError> {
        let conn = self.conn().await?;
        let tx = begin_write(&conn).await?;
        if dto.address.is_primary {
            clear_primary(&tx, dto.client_id).await?;
        }
        let address =
            insert_in::<Address>(&tx, INSERT_ADDRESS, address_params(dto.client_id, &dto.address))
                .await?;
        tx.commit().await.map_err(repo_err)?;
        Ok(address)
    }

    async fn update_address(&self, patch: &AddressPatch) -> Result<Option<Address>, DomainError> {
        self.update_row(
            r#"
            UPDATE addresses SET
                label = COALESCE(?2, label),
                street = COALESCE(?3, street),
                city = COALESCE(?4, city),
                postal_code = COALESCE(?5, postal_code),
                country = COALESCE(?6, country),
                updated_at = ?7
            WHERE id = ?1
            "#,
            vec![
                patch.id.sql(),
                patch.label.sql(),
                patch.street.sql(),
                patch.city.sql(),
                patch.postal_code.sql(),
                patch.country.sql(),
                now(),
            ],
            patch.id,
        )
        .await
    }

    async fn delete_address(&self, id: EntityId) -> Result<bool, DomainError> {
        self.delete_row::<Address>(id).await
    }

    async fn set_primary_address(
        &self,
        req: &PrimaryAddress,
    ) -> Result<Option<Address>, DomainError> {
        let conn = self.conn().await?;
        let tx = begin_write(&conn).await?;
        match find_in::<Address>(&tx, req.address_id).await? {
            Some(address) if address.client_id == req.client_id => {}
            _ => return Ok(None),
        }
        clear_primary(&tx, req.client_id).await?;
        execute(
            &tx,
            "UPDATE addresses SET is_primary = 1, updated_at = ?2 WHERE id = ?1",
            vec![req.address_id.sql(), now()],
        )
        .await?;
        touch_client(&tx, req.client_id).await?;
        let address = find_in::<Address>(&tx, req.address_id).await?;
        tx.commit().await.map_err(repo_err)?;
        Ok(address)
    }

    async fn reassign_address(
        &self,
        req: &AddressReassignment,
    ) -> Result<Option<Address>, DomainError> {
        let conn = self.conn().await?;
        let tx = begin_write(&conn).await?;
        let Some(address) = find_in::<Address>(&tx, req.address_id).await? else {
            return Ok(None);
        };
        if find_in::<Client>(&tx, req.client_id).await?.is_none() {
            return Ok(None);
        }
        let previous_owner = address.client_id;
        execute(
            &tx,
            "UPDATE addresses SET client_id = ?2, is_primary = 0, updated_at = ?3 WHERE id = ?1",
            vec![req.address_id.sql(), req.client_id.sql(), now()],
        )
        .await?;
        touch_client(&tx, previous_owner).await?;
        touch_client(&tx, req.client_id).await?;
        let moved = find_in::<Address>(&tx, req.address_id).await?;
        tx.commit().await.map_err(repo_err)?;

        info!(
            address_id = req.address_id,
            from = previous_owner,
            to = req.client_id,
            "address reassigned"
        );
        Ok(moved)
    }
}
