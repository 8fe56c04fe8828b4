//! Image slots and preview handle lifecycle
//!
//! The upload collaborator hands out one [`PreviewHandle`] per uploaded file.
//! Handles are not `Clone` and [`ImageUploader::release`] consumes them, so a
//! handle can be released at most once. [`ImageSlots`] releases a handle when
//! its slot is overwritten, when it is cleared, or when it is dropped.

use std::collections::{BTreeMap, HashSet};
use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;
use tracing::{debug, warn};
use ulid::Ulid;

use crate::error::{CatalogError, Result};
use crate::types::{ImageSlot, ProductImage};

/// A file picked by the operator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageFile {
    pub name: String,
    pub bytes: Vec<u8>,
}

impl ImageFile {
    pub fn new(name: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            name: name.into(),
            bytes: bytes.into(),
        }
    }
}

/// A live, displayable preview reference. Must be handed back to the
/// uploader that issued it.
#[derive(Debug, PartialEq, Eq)]
pub struct PreviewHandle {
    reference: String,
}

impl PreviewHandle {
    pub fn new(reference: impl Into<String>) -> Self {
        Self {
            reference: reference.into(),
        }
    }

    pub fn reference(&self) -> &str {
        &self.reference
    }
}

/// Upload collaborator: turns files into preview references.
#[async_trait]
pub trait ImageUploader: Send + Sync {
    /// Upload `file` for `slot` and return its preview handle
    async fn upload(&self, file: ImageFile, slot: ImageSlot) -> Result<PreviewHandle>;

    /// Release a preview handle's resources
    fn release(&self, handle: PreviewHandle);
}

/// Slot to preview mapping for one form. At most one handle per slot.
pub struct ImageSlots {
    uploader: Arc<dyn ImageUploader>,
    slots: BTreeMap<ImageSlot, PreviewHandle>,
}

impl ImageSlots {
    pub fn new(uploader: Arc<dyn ImageUploader>) -> Self {
        Self {
            uploader,
            slots: BTreeMap::new(),
        }
    }

    /// Upload `file` into `slot`. A handle already in the slot is released
    /// once the new upload succeeds; a failed upload leaves the slot as it was.
    pub async fn attach(&mut self, slot: ImageSlot, file: ImageFile) -> Result<&PreviewHandle> {
        let handle = self.uploader.upload(file, slot).await?;
        if let Some(previous) = self.slots.insert(slot, handle) {
            debug!(%slot, reference = previous.reference(), "replaced preview");
            self.uploader.release(previous);
        }
        self.slots
            .get(&slot)
            .ok_or_else(|| CatalogError::Upload(format!("slot {slot} vanished")))
    }

    /// Empty `slot`, releasing its handle. Returns whether it was occupied.
    pub fn remove(&mut self, slot: ImageSlot) -> bool {
        match self.slots.remove(&slot) {
            Some(handle) => {
                self.uploader.release(handle);
                true
            }
            None => false,
        }
    }

    /// Release every outstanding handle.
    pub fn release_all(&mut self) {
        let count = self.slots.len();
        for (_, handle) in std::mem::take(&mut self.slots) {
            self.uploader.release(handle);
        }
        if count > 0 {
            debug!(count, "released previews");
        }
    }

    pub fn get(&self, slot: ImageSlot) -> Option<&PreviewHandle> {
        self.slots.get(&slot)
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Current slot references, in slot order.
    pub fn images(&self) -> Vec<ProductImage> {
        self.slots
            .iter()
            .map(|(slot, handle)| ProductImage {
                slot: *slot,
                reference: handle.reference().to_string(),
            })
            .collect()
    }
}

impl Drop for ImageSlots {
    fn drop(&mut self) {
        self.release_all();
    }
}

impl std::fmt::Debug for ImageSlots {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImageSlots")
            .field("slots", &self.slots)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Default)]
struct PreviewLedger {
    outstanding: HashSet<String>,
    released: Vec<String>,
}

/// Uploader that issues `preview:<ulid>` references and records releases.
#[derive(Debug, Default)]
pub struct InMemoryImageUploader {
    ledger: Mutex<PreviewLedger>,
}

impl InMemoryImageUploader {
    pub fn new() -> Self {
        Self::default()
    }

    fn ledger(&self) -> std::sync::MutexGuard<'_, PreviewLedger> {
        self.ledger.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// References issued and not yet released.
    pub fn outstanding(&self) -> Vec<String> {
        let mut refs: Vec<_> = self.ledger().outstanding.iter().cloned().collect();
        refs.sort();
        refs
    }

    /// Every release, in order. A reference appears once per release call.
    pub fn released(&self) -> Vec<String> {
        self.ledger().released.clone()
    }
}

#[async_trait]
impl ImageUploader for InMemoryImageUploader {
    async fn upload(&self, file: ImageFile, slot: ImageSlot) -> Result<PreviewHandle> {
        if file.bytes.is_empty() {
            return Err(CatalogError::Upload(format!("{} is empty", file.name)));
        }
        let reference = format!("preview:{}", Ulid::new());
        self.ledger().outstanding.insert(reference.clone());
        debug!(%slot, file = %file.name, %reference, "issued preview");
        Ok(PreviewHandle::new(reference))
    }

    fn release(&self, handle: PreviewHandle) {
        let mut ledger = self.ledger();
        if !ledger.outstanding.remove(handle.reference()) {
            warn!(reference = handle.reference(), "released unknown preview");
        }
        ledger.released.push(handle.reference);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn png(name: &str) -> ImageFile {
        ImageFile::new(name, vec![0x89, b'P', b'N', b'G'])
    }

    #[tokio::test]
    async fn test_replacing_a_slot_releases_previous_handle() {
        let uploader = Arc::new(InMemoryImageUploader::new());
        let mut slots = ImageSlots::new(uploader.clone());

        let first = slots
            .attach(ImageSlot::Front, png("a.png"))
            .await
            .unwrap()
            .reference()
            .to_string();
        let second = slots
            .attach(ImageSlot::Front, png("b.png"))
            .await
            .unwrap()
            .reference()
            .to_string();

        assert_ne!(first, second);
        assert_eq!(uploader.released(), vec![first]);
        assert_eq!(uploader.outstanding(), vec![second]);
        assert_eq!(slots.len(), 1);
    }

    #[tokio::test]
    async fn test_failed_upload_keeps_slot() {
        let uploader = Arc::new(InMemoryImageUploader::new());
        let mut slots = ImageSlots::new(uploader.clone());
        slots.attach(ImageSlot::Back, png("a.png")).await.unwrap();

        let err = slots
            .attach(ImageSlot::Back, ImageFile::new("empty.png", Vec::new()))
            .await
            .unwrap_err();

        assert!(matches!(err, CatalogError::Upload(_)));
        assert!(uploader.released().is_empty());
        assert!(slots.get(ImageSlot::Back).is_some());
    }

    #[tokio::test]
    async fn test_drop_releases_everything_once() {
        let uploader = Arc::new(InMemoryImageUploader::new());
        {
            let mut slots = ImageSlots::new(uploader.clone());
            for slot in ImageSlot::ALL {
                slots.attach(slot, png("x.png")).await.unwrap();
            }
            assert!(slots.remove(ImageSlot::Additional));
            assert!(!slots.remove(ImageSlot::Additional));
            slots.release_all();
            assert!(slots.is_empty());
        }
        let released = uploader.released();
        assert_eq!(released.len(), 3);
        let unique: HashSet<_> = released.iter().collect();
        assert_eq!(unique.len(), 3);
        assert!(uploader.outstanding().is_empty());
    }

    #[tokio::test]
    async fn test_images_in_slot_order() {
        let uploader = Arc::new(InMemoryImageUploader::new());
        let mut slots = ImageSlots::new(uploader);
        slots.attach(ImageSlot::Additional, png("c.png")).await.unwrap();
        slots.attach(ImageSlot::Front, png("a.png")).await.unwrap();
        let order: Vec<_> = slots.images().iter().map(|i| i.slot).collect();
        assert_eq!(order, vec![ImageSlot::Front, ImageSlot::Additional]);
        assert!(slots.images()[0].reference.starts_with("preview:"));
    }
}
