//! Proptest generators for property-based testing.
//!
//! Every generated file passes validation.

use std::collections::HashSet;

use proptest::prelude::*;
use proptest::collection::SizeRange;
use proptest::sample::Index;

use cloudfiles_core::{File, FileMetadata, OwnerId};

/// Generate a valid file name.
pub fn file_name() -> impl Strategy<Value = String> {
    "[a-z][a-z0-9_-]{0,15}".prop_map(String::from)
}

/// Generate an extension, images included.
pub fn extension() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("txt".to_string()),
        Just("md".to_string()),
        Just("bin".to_string()),
        Just("png".to_string()),
        Just("jpg".to_string()),
        Just("gif".to_string()),
    ]
}

/// Generate file bytes of at most `max_len`.
pub fn payload(max_len: usize) -> impl Strategy<Value = Vec<u8>> {
    prop::collection::vec(any::<u8>(), 0..=max_len)
}

/// Generate an owner.
pub fn owner() -> impl Strategy<Value = OwnerId> {
    "[a-z]{1,12}".prop_map(OwnerId::new)
}

/// Parameters for generating a file.
#[derive(Debug, Clone)]
pub struct FileParams {
    pub name: String,
    pub extension: String,
    pub description: String,
    pub data: Vec<u8>,
}

impl FileParams {
    pub fn to_file(&self) -> File {
        File::new(
            FileMetadata::new(&self.name, &self.extension).with_description(&self.description),
            self.data.clone(),
        )
    }
}

impl Arbitrary for FileParams {
    type Parameters = ();
    type Strategy = BoxedStrategy<Self>;

    fn arbitrary_with(_: Self::Parameters) -> Self::Strategy {
        (file_name(), extension(), "[ -~]{0,32}", payload(512))
            .prop_map(|(name, extension, description, data)| FileParams {
                name,
                extension,
                description,
                data,
            })
            .boxed()
    }
}

/// Generate a file.
pub fn file() -> impl Strategy<Value = File> {
    any::<FileParams>().prop_map(|params| params.to_file())
}

/// Generate a batch of up to `max` files with pairwise distinct names.
pub fn unique_batch(max: usize) -> impl Strategy<Value = Vec<File>> {
    batch_of(0..=max)
}

fn batch_of(size: impl Into<SizeRange>) -> impl Strategy<Value = Vec<File>> {
    prop::collection::btree_set(file_name(), size).prop_flat_map(|names| {
        let names: Vec<String> = names.into_iter().collect();
        let len = names.len();
        (
            Just(names),
            prop::collection::vec((extension(), payload(128)), len),
        )
            .prop_map(|(names, rest)| {
                names
                    .into_iter()
                    .zip(rest)
                    .map(|(name, (extension, data))| File::new(FileMetadata::new(name, extension), data))
                    .collect::<Vec<File>>()
            })
    })
}

/// Generate a batch of up to `max + 1` files in which one name repeats.
///
/// Also yields the position of the first repeated occurrence: the insert at
/// that position is the one a unique `(owner, name)` store rejects.
pub fn batch_with_duplicate(max: usize) -> impl Strategy<Value = (Vec<File>, usize)> {
    (batch_of(1..=max.max(1)), any::<Index>(), any::<Index>())
        .prop_map(|(mut batch, source, position)| {
            let copy = batch[source.index(batch.len())].clone();
            let at = position.index(batch.len() + 1);
            batch.insert(at, copy);

            let mut seen = HashSet::new();
            let conflict = batch
                .iter()
                .position(|f| !seen.insert(f.name().to_string()))
                .unwrap_or(batch.len());
            (batch, conflict)
        })
}
