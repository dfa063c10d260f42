//! Container image remapping

use crate::error::{ConvertError, Result};
use crate::profile::ImageMap;

/// Rewrite an image reference onto the internal registry
///
/// `gcr.io/kubecost1/cost-model:prod-1.101.3` is split into the prefix
/// `gcr.io/kubecost1` and the `cost-model:prod-1.101.3` segment. The prefix
/// must be present in the image map; an empty destination prefix yields the
/// bare `image:tag`.
pub fn remap_image(images: &ImageMap, reference: &str) -> Result<String> {
    let (prefix, image) = reference.rsplit_once('/').unwrap_or(("", reference));

    let destination = images
        .get(prefix)
        .ok_or_else(|| ConvertError::UnmappedImage {
            image: reference.to_string(),
            prefix: prefix.to_string(),
        })?;

    if destination.is_empty() {
        Ok(image.to_string())
    } else {
        Ok(format!("{}/{}", destination, image))
    }
}
