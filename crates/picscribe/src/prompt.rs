//! Caption prompt construction.

use crate::path_meta::AssetMeta;

/// Splits a collection directory name into (number, name) on the first
/// `-`. `coll-42-shapes` becomes `("coll", "42-shapes")`; a name with
/// no dash is used whole on both sides of the prompt.
fn split_collection(collection: &str) -> (&str, &str) {
    match collection.split_once('-') {
        Some((number, name)) => (number, name),
        None => (collection, collection),
    }
}

/// Builds the captioning prompt from a record's discovery-time
/// metadata.
pub fn build_prompt(meta: &AssetMeta) -> String {
    let (number, name) = split_collection(&meta.collection);

    format!(
        "This is asset \"{file}\" ({kind}) from collection {number}, titled \"{name}\". \
         Describe the image in one or two short sentences, focusing on its visual style, \
         shapes and colors. Do not mention file formats or collection numbers in the answer.",
        file = meta.file,
        kind = meta.kind,
        number = number,
        name = name,
    )
}
