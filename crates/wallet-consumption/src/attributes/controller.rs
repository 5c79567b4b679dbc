//! The attributes controller.
//!
//! All create/succeed/delete operations over local attributes, enforcing
//! the succession and deletion invariants. Every operation is async over
//! the persistent attribute collection; every mutation is persisted before
//! the operation returns.

use chrono::{DateTime, Utc};
use serde_json::json;
use std::collections::HashSet;
use wallet_core::{
    Address, AttributeContent, AttributeId, IdentityAttribute, IdentityAttributeQuery,
    RelationshipAttributeQuery,
};
use wallet_store::{DocumentQuery, TypedCollection};

use crate::account::AccountContext;
use crate::attributes::local_attribute::{
    AttributeKind, DeletionInfo, LocalAttribute, SharingReference,
};
use crate::attributes::succession::{
    validate_fixed_successor_id, validate_succession, validate_succession_peer,
    AttributeSuccessorParams, SuccessionPair,
};
use crate::error::{ConsumptionError, ConsumptionResult};

/// Parameters for creating a repository attribute.
#[derive(Debug, Clone, PartialEq)]
pub struct CreateRepositoryAttributeParams {
    /// The attribute's content; its owner must be the local identity.
    pub content: AttributeContent,
}

/// Parameters for creating an own-shared copy from a repository attribute.
#[derive(Debug, Clone, PartialEq)]
pub struct CreateSharedAttributeCopyParams {
    /// The repository attribute to copy.
    pub source_attribute_id: AttributeId,
    /// The peer the copy is shared with.
    pub peer: Address,
    /// The exchange creating the copy.
    pub reference: SharingReference,
}

/// Parameters for creating an own-shared copy directly from content.
#[derive(Debug, Clone, PartialEq)]
pub struct CreateOwnSharedAttributeParams {
    /// Caller-fixed id; peers keep shared copies under the same id.
    pub id: Option<AttributeId>,
    /// The shared content.
    pub content: AttributeContent,
    /// The peer the copy is shared with.
    pub peer: Address,
    /// The exchange creating the copy.
    pub reference: SharingReference,
    /// The repository attribute backing the copy, if any.
    pub source_attribute_id: Option<AttributeId>,
}

/// Parameters for creating a peer-shared copy from received content.
#[derive(Debug, Clone, PartialEq)]
pub struct CreatePeerSharedAttributeParams {
    /// Caller-fixed id; peers keep shared copies under the same id.
    pub id: Option<AttributeId>,
    /// The received content.
    pub content: AttributeContent,
    /// The peer that shared the content.
    pub peer: Address,
    /// The exchange creating the copy.
    pub reference: SharingReference,
}

/// Parameters for creating a third-party relationship attribute copy.
#[derive(Debug, Clone, PartialEq)]
pub struct CreateThirdPartyRelationshipAttributeParams {
    /// Caller-fixed id; peers keep shared copies under the same id.
    pub id: Option<AttributeId>,
    /// The received content.
    pub content: AttributeContent,
    /// The peer the copy was exchanged with.
    pub peer: Address,
    /// The exchange creating the copy.
    pub reference: SharingReference,
    /// The third party the attribute stems from.
    pub third_party_address: Option<Address>,
}

/// Which shape a succession operation expects its predecessor to have.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SuccessionVariant {
    Repository,
    OwnSharedIdentity,
    PeerSharedIdentity,
    OwnSharedRelationship,
    PeerSharedRelationship,
    ThirdPartyRelationship,
}

impl SuccessionVariant {
    fn expected(self) -> &'static str {
        match self {
            Self::Repository => "repository",
            Self::OwnSharedIdentity => "own-shared identity",
            Self::PeerSharedIdentity => "peer-shared identity",
            Self::OwnSharedRelationship => "own-shared relationship",
            Self::PeerSharedRelationship => "peer-shared relationship",
            Self::ThirdPartyRelationship => "third-party relationship",
        }
    }

    fn matches(self, attribute: &LocalAttribute) -> bool {
        match self {
            Self::Repository => attribute.is_repository(),
            Self::OwnSharedIdentity => {
                attribute.is_own_shared() && attribute.content.is_identity()
            }
            Self::PeerSharedIdentity => {
                attribute.is_peer_shared() && attribute.content.is_identity()
            }
            Self::OwnSharedRelationship => {
                attribute.is_own_shared() && attribute.content.is_relationship()
            }
            Self::PeerSharedRelationship => {
                attribute.is_peer_shared() && attribute.content.is_relationship()
            }
            Self::ThirdPartyRelationship => attribute.is_third_party(),
        }
    }
}

/// CRUD, succession, and deletion operations over local attributes.
#[derive(Clone)]
pub struct AttributesController {
    attributes: TypedCollection<LocalAttribute>,
    account: AccountContext,
}

impl AttributesController {
    /// Creates a controller over the given attribute collection.
    #[must_use]
    pub fn new(attributes: TypedCollection<LocalAttribute>, account: AccountContext) -> Self {
        Self {
            attributes,
            account,
        }
    }

    /// The account this controller operates for.
    #[must_use]
    pub fn account(&self) -> &AccountContext {
        &self.account
    }

    // ==================== Creation ====================

    /// Creates a repository attribute owned by the local identity.
    ///
    /// Complex identity values additionally create one child repository
    /// attribute per component, linked via `parent_id`.
    pub async fn create_repository_attribute(
        &self,
        params: CreateRepositoryAttributeParams,
    ) -> ConsumptionResult<LocalAttribute> {
        if params.content.owner() != &self.account.address {
            return Err(ConsumptionError::SenderIsNotOwner);
        }

        let attribute = LocalAttribute {
            id: AttributeId::new(),
            content: params.content,
            created_at: Utc::now(),
            kind: AttributeKind::Repository,
            succeeds: None,
            succeeded_by: None,
            parent_id: None,
            deletion_info: None,
        };
        self.attributes
            .insert(&attribute.id.to_string(), &attribute)
            .await?;

        if let AttributeContent::Identity(identity) = &attribute.content {
            self.create_children(&attribute, identity).await?;
        }

        tracing::debug!(
            attribute = %attribute.id,
            value_type = attribute.content.value_type(),
            "Created repository attribute"
        );

        Ok(attribute)
    }

    /// Creates the child repository attributes of a complex identity value.
    async fn create_children(
        &self,
        parent: &LocalAttribute,
        identity: &IdentityAttribute,
    ) -> ConsumptionResult<()> {
        for child_value in identity.value.children() {
            let child = LocalAttribute {
                id: AttributeId::new(),
                content: AttributeContent::Identity(IdentityAttribute::new(
                    identity.owner,
                    child_value,
                )),
                created_at: Utc::now(),
                kind: AttributeKind::Repository,
                succeeds: None,
                succeeded_by: None,
                parent_id: Some(parent.id),
                deletion_info: None,
            };
            self.attributes.insert(&child.id.to_string(), &child).await?;
        }
        Ok(())
    }

    /// Creates an own-shared copy of an existing repository attribute.
    pub async fn create_shared_local_attribute_copy(
        &self,
        params: CreateSharedAttributeCopyParams,
    ) -> ConsumptionResult<LocalAttribute> {
        let source = self.get_local_attribute(params.source_attribute_id).await?;
        if !source.is_repository() {
            return Err(ConsumptionError::SourceAttributeIsNotRepository(source.id));
        }

        self.create_own_shared_local_attribute(CreateOwnSharedAttributeParams {
            id: None,
            content: source.content.clone(),
            peer: params.peer,
            reference: params.reference,
            source_attribute_id: Some(source.id),
        })
        .await
    }

    /// Creates an own-shared attribute directly from content.
    ///
    /// Used by item processors mirroring an accept response: the copy's id
    /// is fixed to the id the peer created, so both sides keep the shared
    /// copy under the same id.
    pub async fn create_own_shared_local_attribute(
        &self,
        params: CreateOwnSharedAttributeParams,
    ) -> ConsumptionResult<LocalAttribute> {
        let attribute = LocalAttribute {
            id: params.id.unwrap_or_default(),
            content: params.content,
            created_at: Utc::now(),
            kind: AttributeKind::OwnShared {
                peer: params.peer,
                reference: params.reference,
                source_attribute_id: params.source_attribute_id,
            },
            succeeds: None,
            succeeded_by: None,
            parent_id: None,
            deletion_info: None,
        };
        self.attributes
            .insert(&attribute.id.to_string(), &attribute)
            .await?;

        tracing::debug!(
            attribute = %attribute.id,
            peer = %params.peer,
            "Created own-shared attribute copy"
        );

        Ok(attribute)
    }

    /// Creates a peer-shared attribute from received content.
    pub async fn create_peer_shared_local_attribute(
        &self,
        params: CreatePeerSharedAttributeParams,
    ) -> ConsumptionResult<LocalAttribute> {
        let attribute = LocalAttribute {
            id: params.id.unwrap_or_default(),
            content: params.content,
            created_at: Utc::now(),
            kind: AttributeKind::PeerShared {
                peer: params.peer,
                reference: params.reference,
            },
            succeeds: None,
            succeeded_by: None,
            parent_id: None,
            deletion_info: None,
        };
        self.attributes
            .insert(&attribute.id.to_string(), &attribute)
            .await?;

        tracing::debug!(
            attribute = %attribute.id,
            peer = %params.peer,
            "Created peer-shared attribute copy"
        );

        Ok(attribute)
    }

    /// Creates a third-party relationship attribute copy.
    pub async fn create_third_party_relationship_attribute(
        &self,
        params: CreateThirdPartyRelationshipAttributeParams,
    ) -> ConsumptionResult<LocalAttribute> {
        let attribute = LocalAttribute {
            id: params.id.unwrap_or_default(),
            content: params.content,
            created_at: Utc::now(),
            kind: AttributeKind::ThirdPartyRelationship {
                peer: params.peer,
                reference: params.reference,
                third_party_address: params.third_party_address,
            },
            succeeds: None,
            succeeded_by: None,
            parent_id: None,
            deletion_info: None,
        };
        self.attributes
            .insert(&attribute.id.to_string(), &attribute)
            .await?;
        Ok(attribute)
    }

    // ==================== Reads ====================

    /// Reads an attribute, failing if it does not exist.
    pub async fn get_local_attribute(
        &self,
        id: AttributeId,
    ) -> ConsumptionResult<LocalAttribute> {
        self.get_local_attribute_opt(id)
            .await?
            .ok_or(ConsumptionError::AttributeNotFound(id))
    }

    /// Reads an attribute that may be absent.
    pub async fn get_local_attribute_opt(
        &self,
        id: AttributeId,
    ) -> ConsumptionResult<Option<LocalAttribute>> {
        Ok(self.attributes.get(&id.to_string()).await?)
    }

    /// Returns all attributes matching a raw document query.
    pub async fn get_local_attributes(
        &self,
        query: &DocumentQuery,
    ) -> ConsumptionResult<Vec<LocalAttribute>> {
        Ok(self.attributes.find(query).await?)
    }

    /// Repository attributes answering an identity attribute query.
    ///
    /// Matches current versions (no successor) of top-level repository
    /// attributes with the queried value type, carrying all queried tags,
    /// valid over the queried window.
    pub async fn execute_identity_attribute_query(
        &self,
        query: &IdentityAttributeQuery,
    ) -> ConsumptionResult<Vec<LocalAttribute>> {
        let document_query = DocumentQuery::new()
            .field("kind.type", json!("Repository"))
            .field("content.@type", json!("Identity"))
            .field("content.value.@type", json!(query.value_type))
            .is_null("succeeded_by")
            .is_null("parent_id");
        let candidates = self.attributes.find(&document_query).await?;

        Ok(candidates
            .into_iter()
            .filter(|attribute| match &attribute.content {
                AttributeContent::Identity(identity) => {
                    query.tags.iter().all(|tag| identity.tags.contains(tag))
                        && window_covers(
                            identity.valid_from,
                            identity.valid_to,
                            query.valid_from,
                            query.valid_to,
                        )
                }
                AttributeContent::Relationship(_) => false,
            })
            .collect())
    }

    /// Relationship attributes answering a relationship attribute query.
    pub async fn execute_relationship_attribute_query(
        &self,
        query: &RelationshipAttributeQuery,
    ) -> ConsumptionResult<Vec<LocalAttribute>> {
        let document_query = DocumentQuery::new()
            .field("content.@type", json!("Relationship"))
            .field("content.key", json!(query.key))
            .field("content.value.@type", json!(query.value_type))
            .is_null("succeeded_by");
        let candidates = self.attributes.find(&document_query).await?;

        Ok(candidates
            .into_iter()
            .filter(|attribute| match &attribute.content {
                AttributeContent::Relationship(relationship) => {
                    query
                        .owner
                        .is_none_or(|owner| relationship.owner == owner)
                        && query
                            .confidentiality
                            .is_none_or(|c| relationship.confidentiality == c)
                }
                AttributeContent::Identity(_) => false,
            })
            .collect())
    }

    // ==================== Succession ====================

    /// Succeeds a repository attribute.
    pub async fn succeed_repository_attribute(
        &self,
        predecessor_id: AttributeId,
        params: AttributeSuccessorParams,
    ) -> ConsumptionResult<SuccessionPair> {
        self.succeed_attribute(predecessor_id, params, SuccessionVariant::Repository)
            .await
    }

    /// Succeeds an own-shared identity attribute copy.
    pub async fn succeed_own_shared_identity_attribute(
        &self,
        predecessor_id: AttributeId,
        params: AttributeSuccessorParams,
    ) -> ConsumptionResult<SuccessionPair> {
        self.succeed_attribute(predecessor_id, params, SuccessionVariant::OwnSharedIdentity)
            .await
    }

    /// Succeeds a peer-shared identity attribute copy.
    pub async fn succeed_peer_shared_identity_attribute(
        &self,
        predecessor_id: AttributeId,
        params: AttributeSuccessorParams,
    ) -> ConsumptionResult<SuccessionPair> {
        self.succeed_attribute(predecessor_id, params, SuccessionVariant::PeerSharedIdentity)
            .await
    }

    /// Succeeds an own-shared relationship attribute copy.
    pub async fn succeed_own_shared_relationship_attribute(
        &self,
        predecessor_id: AttributeId,
        params: AttributeSuccessorParams,
    ) -> ConsumptionResult<SuccessionPair> {
        self.succeed_attribute(
            predecessor_id,
            params,
            SuccessionVariant::OwnSharedRelationship,
        )
        .await
    }

    /// Succeeds a peer-shared relationship attribute copy.
    pub async fn succeed_peer_shared_relationship_attribute(
        &self,
        predecessor_id: AttributeId,
        params: AttributeSuccessorParams,
    ) -> ConsumptionResult<SuccessionPair> {
        self.succeed_attribute(
            predecessor_id,
            params,
            SuccessionVariant::PeerSharedRelationship,
        )
        .await
    }

    /// Succeeds a third-party relationship attribute copy.
    pub async fn succeed_third_party_relationship_attribute(
        &self,
        predecessor_id: AttributeId,
        params: AttributeSuccessorParams,
    ) -> ConsumptionResult<SuccessionPair> {
        self.succeed_attribute(
            predecessor_id,
            params,
            SuccessionVariant::ThirdPartyRelationship,
        )
        .await
    }

    /// Shared succession core: validates invariants, creates the successor,
    /// and links both versions.
    async fn succeed_attribute(
        &self,
        predecessor_id: AttributeId,
        params: AttributeSuccessorParams,
        variant: SuccessionVariant,
    ) -> ConsumptionResult<SuccessionPair> {
        let mut predecessor = self.get_local_attribute(predecessor_id).await?;
        if !variant.matches(&predecessor) {
            return Err(ConsumptionError::UnexpectedAttributeKind {
                id: predecessor.id,
                expected: variant.expected(),
            });
        }

        validate_succession(&predecessor, &params.content)?;
        validate_succession_peer(&predecessor, params.peer.as_ref())?;
        if let Some(fixed_id) = params.id {
            let existing = self.get_local_attribute_opt(fixed_id).await?;
            validate_fixed_successor_id(existing.as_ref())?;
        }

        let successor_kind = match &predecessor.kind {
            AttributeKind::Repository => AttributeKind::Repository,
            AttributeKind::OwnShared {
                peer,
                reference,
                source_attribute_id,
            } => AttributeKind::OwnShared {
                peer: *peer,
                reference: params.reference.unwrap_or(*reference),
                source_attribute_id: params.source_attribute_id.or(*source_attribute_id),
            },
            AttributeKind::PeerShared { peer, reference } => AttributeKind::PeerShared {
                peer: *peer,
                reference: params.reference.unwrap_or(*reference),
            },
            AttributeKind::ThirdPartyRelationship {
                peer,
                reference,
                third_party_address,
            } => AttributeKind::ThirdPartyRelationship {
                peer: *peer,
                reference: params.reference.unwrap_or(*reference),
                third_party_address: *third_party_address,
            },
        };

        let successor = LocalAttribute {
            id: params.id.unwrap_or_default(),
            content: params.content,
            created_at: Utc::now(),
            kind: successor_kind,
            succeeds: Some(predecessor.id),
            succeeded_by: None,
            parent_id: None,
            deletion_info: None,
        };
        self.attributes
            .insert(&successor.id.to_string(), &successor)
            .await?;

        predecessor.succeeded_by = Some(successor.id);
        self.attributes
            .update(&predecessor.id.to_string(), &predecessor)
            .await?;

        if variant == SuccessionVariant::Repository {
            self.succeed_children(&predecessor, &successor).await?;
        }

        tracing::info!(
            predecessor = %predecessor.id,
            successor = %successor.id,
            value_type = successor.content.value_type(),
            "Succeeded attribute"
        );

        Ok(SuccessionPair {
            predecessor,
            successor,
        })
    }

    /// Implicitly succeeds the children of a complex repository attribute.
    ///
    /// Each successor component becomes a child of the successor; where a
    /// predecessor child of the same value type exists, the two are linked.
    async fn succeed_children(
        &self,
        predecessor: &LocalAttribute,
        successor: &LocalAttribute,
    ) -> ConsumptionResult<()> {
        let AttributeContent::Identity(identity) = &successor.content else {
            return Ok(());
        };
        if !identity.value.is_complex() {
            return Ok(());
        }

        let predecessor_children = self
            .attributes
            .find(&DocumentQuery::new().field("parent_id", json!(predecessor.id)))
            .await?;

        for child_value in identity.value.children() {
            let old_child = predecessor_children
                .iter()
                .find(|child| child.content.value_type() == child_value.value_type());

            let child = LocalAttribute {
                id: AttributeId::new(),
                content: AttributeContent::Identity(IdentityAttribute::new(
                    identity.owner,
                    child_value,
                )),
                created_at: Utc::now(),
                kind: AttributeKind::Repository,
                succeeds: old_child.map(|c| c.id),
                succeeded_by: None,
                parent_id: Some(successor.id),
                deletion_info: None,
            };
            self.attributes.insert(&child.id.to_string(), &child).await?;

            if let Some(old_child) = old_child {
                let mut old_child = old_child.clone();
                old_child.succeeded_by = Some(child.id);
                self.attributes
                    .update(&old_child.id.to_string(), &old_child)
                    .await?;
            }
        }
        Ok(())
    }

    // ==================== Deletion ====================

    /// Sets deletion info on a shared attribute record.
    ///
    /// Fails on repository attributes and on statuses outside the allowed
    /// set for the record's kind.
    pub async fn set_deletion_info(
        &self,
        id: AttributeId,
        info: DeletionInfo,
    ) -> ConsumptionResult<LocalAttribute> {
        let mut attribute = self.get_local_attribute(id).await?;
        self.validate_deletion_info(&attribute, info)?;

        attribute.deletion_info = Some(info);
        self.attributes
            .update(&attribute.id.to_string(), &attribute)
            .await?;

        tracing::info!(
            attribute = %attribute.id,
            status = %info.status,
            "Set attribute deletion info"
        );

        Ok(attribute)
    }

    /// Applies peer-initiated deletion info to an attribute and its
    /// predecessors.
    ///
    /// Walks the predecessor chain applying the same info; records already
    /// carrying a terminal status keep it. Returns the records that were
    /// updated.
    pub async fn set_peer_deletion_info_of_peer_attribute_and_predecessors(
        &self,
        id: AttributeId,
        info: DeletionInfo,
    ) -> ConsumptionResult<Vec<LocalAttribute>> {
        let attribute = self.get_local_attribute(id).await?;
        self.validate_deletion_info(&attribute, info)?;

        let mut chain = vec![attribute];
        chain.extend(self.get_predecessors_of_attribute(id).await?);

        let mut updated = Vec::new();
        for mut record in chain {
            if record
                .deletion_info
                .is_some_and(|existing| existing.status.is_terminal())
            {
                continue;
            }
            record.deletion_info = Some(info);
            self.attributes
                .update(&record.id.to_string(), &record)
                .await?;
            updated.push(record);
        }

        tracing::info!(
            attribute = %id,
            status = %info.status,
            records = updated.len(),
            "Propagated peer deletion info along predecessor chain"
        );

        Ok(updated)
    }

    /// Removes deletion info from a record if it matches exactly.
    ///
    /// Rollback helper for notification processing: only the info a
    /// specific item stamped (same status and date) is cleared, so
    /// pre-existing deletion states survive the rollback.
    pub async fn clear_deletion_info_if_matches(
        &self,
        id: AttributeId,
        info: DeletionInfo,
    ) -> ConsumptionResult<bool> {
        let Some(mut attribute) = self.get_local_attribute_opt(id).await? else {
            return Ok(false);
        };
        if attribute.deletion_info != Some(info) {
            return Ok(false);
        }

        attribute.deletion_info = None;
        self.attributes
            .update(&attribute.id.to_string(), &attribute)
            .await?;
        Ok(true)
    }

    fn validate_deletion_info(
        &self,
        attribute: &LocalAttribute,
        info: DeletionInfo,
    ) -> ConsumptionResult<()> {
        if attribute.is_repository() {
            return Err(ConsumptionError::CannotDeleteRepositoryAttribute(
                attribute.id,
            ));
        }
        if !attribute.kind.allows_deletion_status(info.status) {
            return Err(ConsumptionError::InvalidDeletionStatusForKind {
                status: info.status,
                kind: attribute.kind.name(),
            });
        }
        Ok(())
    }

    // ==================== Chains ====================

    /// The ordered predecessor chain of an attribute, immediate predecessor
    /// first.
    pub async fn get_predecessors_of_attribute(
        &self,
        id: AttributeId,
    ) -> ConsumptionResult<Vec<LocalAttribute>> {
        let start = self.get_local_attribute(id).await?;
        let mut visited: HashSet<AttributeId> = HashSet::from([start.id]);
        let mut chain = Vec::new();

        let mut next = start.succeeds;
        while let Some(predecessor_id) = next {
            if !visited.insert(predecessor_id) {
                // Link cycle in stored data; stop rather than loop.
                tracing::warn!(attribute = %id, "Cycle in predecessor chain");
                break;
            }
            let Some(predecessor) = self.get_local_attribute_opt(predecessor_id).await? else {
                break;
            };
            next = predecessor.succeeds;
            chain.push(predecessor);
        }
        Ok(chain)
    }

    /// The ordered successor chain of an attribute, immediate successor
    /// first.
    pub async fn get_successors_of_attribute(
        &self,
        id: AttributeId,
    ) -> ConsumptionResult<Vec<LocalAttribute>> {
        let start = self.get_local_attribute(id).await?;
        let mut visited: HashSet<AttributeId> = HashSet::from([start.id]);
        let mut chain = Vec::new();

        let mut next = start.succeeded_by;
        while let Some(successor_id) = next {
            if !visited.insert(successor_id) {
                tracing::warn!(attribute = %id, "Cycle in successor chain");
                break;
            }
            let Some(successor) = self.get_local_attribute_opt(successor_id).await? else {
                break;
            };
            next = successor.succeeded_by;
            chain.push(successor);
        }
        Ok(chain)
    }

    // ==================== Unsafe / physical mutation ====================

    /// Persists an already-validated attribute mutation.
    ///
    /// Bypasses every invariant check; intended for processors that have
    /// validated the state transition themselves (e.g. notification
    /// rollback restoring a prior link state).
    pub async fn update_attribute_unsafe(
        &self,
        attribute: &LocalAttribute,
    ) -> ConsumptionResult<()> {
        self.attributes
            .update(&attribute.id.to_string(), attribute)
            .await?;
        Ok(())
    }

    /// Physically deletes an attribute record and its children.
    ///
    /// Returns whether a record was removed. Repository attributes are the
    /// only kind deleted this way in normal operation; shared copies are
    /// removed physically only by notification rollback.
    pub async fn delete_attribute(&self, id: AttributeId) -> ConsumptionResult<bool> {
        let children = self
            .attributes
            .find(&DocumentQuery::new().field("parent_id", json!(id)))
            .await?;
        for child in children {
            self.attributes.delete(&child.id.to_string()).await?;
        }
        Ok(self.attributes.delete(&id.to_string()).await?)
    }

    /// Physically deletes all attributes exchanged with a peer.
    ///
    /// Used when a relationship is torn down. Returns the number of
    /// removed records.
    pub async fn delete_attributes_exchanged_with_peer(
        &self,
        peer: &Address,
    ) -> ConsumptionResult<usize> {
        let shared = self
            .attributes
            .find(&DocumentQuery::new().field("kind.peer", json!(peer)))
            .await?;
        let mut removed = 0;
        for attribute in shared {
            if self.attributes.delete(&attribute.id.to_string()).await? {
                removed += 1;
            }
        }

        tracing::info!(peer = %peer, removed, "Deleted attributes exchanged with peer");

        Ok(removed)
    }
}

/// Whether the answer window `[from, to]` covers the queried window.
fn window_covers(
    answer_from: Option<DateTime<Utc>>,
    answer_to: Option<DateTime<Utc>>,
    query_from: Option<DateTime<Utc>>,
    query_to: Option<DateTime<Utc>>,
) -> bool {
    let from_ok = match (answer_from, query_from) {
        (Some(answer), Some(query)) => answer <= query,
        _ => true,
    };
    let to_ok = match (answer_to, query_to) {
        (Some(answer), Some(query)) => answer >= query,
        (Some(_), None) => false,
        _ => true,
    };
    from_ok && to_ok
}
