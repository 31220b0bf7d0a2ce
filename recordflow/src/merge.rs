//! Pre-image merging.
//!
//! Change payloads carry only the attributes that changed. Filling the
//! remaining attributes from the pre-image gives rules the full record.

use crate::core::Record;

/// Copies every attribute of `pre` that `post` lacks into `post`.
///
/// Attributes already on `post` are never overwritten, whatever their
/// value; a [`Cleared`](crate::core::AttributeValue::Cleared) attribute
/// counts as present. With no pre-image, `post` is returned untouched.
pub fn merge_pre_image<'a>(post: &'a mut Record, pre: Option<&Record>) -> &'a mut Record {
    let Some(pre) = pre else {
        return post;
    };
    for (key, value) in &pre.attributes {
        if !post.attributes.contains_key(key) {
            post.attributes.insert(key.clone(), value.clone());
        }
    }
    post
}
