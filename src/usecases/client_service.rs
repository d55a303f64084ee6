//! Client service. Clients, their addresses and the address moves between clients.

use super::{PageLimits, deleted, found};
use crate::domain::dto::{
    AddressPatch, AddressReassignment, ClientPatch, NewAddress, NewClient, PrimaryAddress,
};
use crate::domain::{Address, Client, ClientDetail, DomainError, EntityId, ListQuery, Page};
use crate::ports::ClientRepo;
use std::sync::Arc;

pub struct ClientService {
    repo: Arc<dyn ClientRepo>,
    limits: PageLimits,
}

impl ClientService {
    pub fn new(repo: Arc<dyn ClientRepo>, limits: PageLimits) -> Self {
        Self { repo, limits }
    }

    pub async fn get_all_clients(&self, query: &ListQuery) -> Result<Page<Client>, DomainError> {
        self.repo.list_clients(query, self.limits.request(query)).await
    }

    pub async fn get_client(&self, id: EntityId) -> Result<ClientDetail, DomainError> {
        found("client", id, self.repo.get_client(id).await?)
    }

    pub async fn create_client(&self, dto: &NewClient) -> Result<ClientDetail, DomainError> {
        dto.validate()?;
        self.repo.create_client(dto).await
    }

    pub async fn update_client(&self, patch: &ClientPatch) -> Result<Client, DomainError> {
        patch.validate()?;
        found("client", patch.id, self.repo.update_client(patch).await?)
    }

    pub async fn delete_client(&self, id: EntityId) -> Result<bool, DomainError> {
        Ok(deleted("client", id, self.repo.delete_client(id).await))
    }

    pub async fn get_all_addresses(&self, query: &ListQuery) -> Result<Page<Address>, DomainError> {
        self.repo
            .list_addresses(query, self.limits.request(query))
            .await
    }

    pub async fn get_address(&self, id: EntityId) -> Result<Address, DomainError> {
        found("address", id, self.repo.get_address(id).await?)
    }

    pub async fn create_address(&self, dto: &NewAddress) -> Result<Address, DomainError> {
        dto.address.validate()?;
        self.ensure_client(dto.client_id).await?;
        self.repo.create_address(dto).await
    }

    pub async fn update_address(&self, patch: &AddressPatch) -> Result<Address, DomainError> {
        patch.validate()?;
        found("address", patch.id, self.repo.update_address(patch).await?)
    }

    pub async fn delete_address(&self, id: EntityId) -> Result<bool, DomainError> {
        Ok(deleted("address", id, self.repo.delete_address(id).await))
    }

    /// Makes the address the client's only primary one.
    pub async fn set_primary_address(&self, req: &PrimaryAddress) -> Result<Address, DomainError> {
        self.ensure_client(req.client_id).await?;
        let address = self.get_address(req.address_id).await?;
        if address.client_id != req.client_id {
            return Err(DomainError::Validation(format!(
                "address {} does not belong to client {}",
                req.address_id, req.client_id
            )));
        }
        found(
            "address",
            req.address_id,
            self.repo.set_primary_address(req).await?,
        )
    }

    /// Moves an address to another client. The moved address loses its primary flag.
    pub async fn reassign_address(
        &self,
        req: &AddressReassignment,
    ) -> Result<Address, DomainError> {
        self.get_address(req.address_id).await?;
        self.ensure_client(req.client_id).await?;
        found(
            "address",
            req.address_id,
            self.repo.reassign_address(req).await?,
        )
    }

    async fn ensure_client(&self, id: EntityId) -> Result<(), DomainError> {
        self.get_client(id).await.map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::persistence::sqlite_repo::test_support::repo;
    use crate::domain::dto::AddressInput;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tempfile::TempDir;
    use tracing::field::{Field, Visit};
    use tracing_subscriber::Layer;
    use tracing_subscriber::layer::{Context, SubscriberExt};

    async fn service() -> (ClientService, TempDir) {
        let (repo, dir) = repo().await;
        (ClientService::new(Arc::new(repo), PageLimits::default()), dir)
    }

    fn street(city: &str, primary: bool) -> AddressInput {
        AddressInput {
            street: "1 Main St".into(),
            city: city.into(),
            is_primary: primary,
            ..Default::default()
        }
    }

    /// Counts events logged with a given message.
    struct CountMessage {
        message: &'static str,
        hits: Arc<AtomicUsize>,
    }

    struct MessageField(Option<String>);

    impl Visit for MessageField {
        fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
            if field.name() == "message" {
                self.0 = Some(format!("{value:?}"));
            }
        }
    }

    impl<S: tracing::Subscriber> Layer<S> for CountMessage {
        fn on_event(&self, event: &tracing::Event<'_>, _ctx: Context<'_, S>) {
            let mut field = MessageField(None);
            event.record(&mut field);
            if field.0.as_deref() == Some(self.message) {
                self.hits.fetch_add(1, Ordering::SeqCst);
            }
        }
    }

    #[tokio::test]
    async fn client_creation_is_logged_once() {
        let hits = Arc::new(AtomicUsize::new(0));
        let subscriber = tracing_subscriber::registry().with(CountMessage {
            message: "client created",
            hits: Arc::clone(&hits),
        });
        let _guard = tracing::subscriber::set_default(subscriber);

        let (svc, _dir) = service().await;
        let created = svc
            .create_client(&NewClient {
                name: "Oak & Co".into(),
                addresses: vec![street("York", true)],
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(created.addresses.len(), 1);
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn blank_name_is_rejected() {
        let (svc, _dir) = service().await;
        let err = svc
            .create_client(&NewClient {
                name: "  ".into(),
                ..Default::default()
            })
            .await
            .unwrap_err();
        assert_eq!(err.code(), "BAD_REQUEST");
    }

    #[tokio::test]
    async fn missing_client_is_not_found() {
        let (svc, _dir) = service().await;
        let err = svc.get_client(9).await.unwrap_err();
        assert!(matches!(err, DomainError::NotFound { entity: "client", id: 9 }));

        let err = svc
            .update_client(&ClientPatch {
                id: 9,
                name: Some("x".into()),
                ..Default::default()
            })
            .await
            .unwrap_err();
        assert_eq!(err.code(), "NOT_FOUND");
        assert!(!svc.delete_client(9).await.unwrap());
    }

    #[tokio::test]
    async fn address_for_unknown_client_is_not_found() {
        let (svc, _dir) = service().await;
        let err = svc
            .create_address(&NewAddress {
                client_id: 5,
                address: street("Oslo", false),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::NotFound { entity: "client", .. }));
    }

    #[tokio::test]
    async fn primary_address_must_belong_to_client() {
        let (svc, _dir) = service().await;
        let a = svc
            .create_client(&NewClient {
                name: "A".into(),
                addresses: vec![street("Bergen", true)],
                ..Default::default()
            })
            .await
            .unwrap();
        let b = svc
            .create_client(&NewClient {
                name: "B".into(),
                ..Default::default()
            })
            .await
            .unwrap();

        let err = svc
            .set_primary_address(&PrimaryAddress {
                client_id: b.client.id,
                address_id: a.addresses[0].id,
            })
            .await
            .unwrap_err();
        assert_eq!(err.code(), "BAD_REQUEST");

        let moved = svc
            .reassign_address(&AddressReassignment {
                address_id: a.addresses[0].id,
                client_id: b.client.id,
            })
            .await
            .unwrap();
        assert_eq!(moved.client_id, b.client.id);
        assert!(!moved.is_primary);
        assert!(svc.get_client(a.client.id).await.unwrap().addresses.is_empty());
    }

    #[tokio::test]
    async fn list_respects_page_limits() {
        let (repo, _dir) = repo().await;
        let limits = PageLimits {
            default_size: 2,
            max_size: 3,
        };
        let svc = ClientService::new(Arc::new(repo), limits);
        for name in ["a", "b", "c", "d"] {
            svc.create_client(&NewClient {
                name: name.into(),
                ..Default::default()
            })
            .await
            .unwrap();
        }

        let page = svc.get_all_clients(&ListQuery::default()).await.unwrap();
        assert_eq!((page.items.len(), page.total, page.limit), (2, 4, 2));

        let big = ListQuery {
            limit: Some(50),
            page: Some(2),
            ..Default::default()
        };
        let page = svc.get_all_clients(&big).await.unwrap();
        assert_eq!(page.limit, 3);
        assert_eq!(page.items.len(), 1);
        assert_eq!(page.items[0].name, "d");
    }
}
