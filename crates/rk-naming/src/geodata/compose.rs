//! Element name registration, composition, hashing and merging

use crate::constants::HASHED_NAME_PREFIX;
use crate::element_map::{ElementMapError, ElementMapResult};
use crate::element_name::{element_type_tag, is_mapped_element};
use crate::hasher::StringIdRef;

use super::GeoData;

impl GeoData {
    /// Hash an element name into a compact `#<type><id>` token
    ///
    /// The id used is appended to `string_ids`. Without a hasher, or when the
    /// name is shorter than the hasher threshold, the name is returned
    /// unchanged.
    pub fn hash_element_name(
        &self,
        type_tag: char,
        name: &str,
        string_ids: &mut Vec<StringIdRef>,
    ) -> ElementMapResult<String> {
        if name.is_empty() {
            return Err(ElementMapError::InvalidName("empty element name".into()));
        }
        let Some(hasher) = self.hasher.as_ref().filter(|h| h.is_hashable(name)) else {
            return Ok(name.to_string());
        };
        let sid = hasher.get_id(name);
        let token = format!("{}{}{}", HASHED_NAME_PREFIX, type_tag, sid.value());
        string_ids.push(sid);
        Ok(token)
    }

    /// Register `name` as a mapped name of the raw subelement `element`
    ///
    /// An empty `name` removes every mapping of `element` instead. A leading
    /// mapped name marker on `name` is dropped. When no `string_ids` are given
    /// and a hasher is configured, the name is stored hashed.
    ///
    /// Returns the mapped name as stored.
    pub fn set_element_name(
        &mut self,
        element: &str,
        name: &str,
        string_ids: &[StringIdRef],
        overwrite: bool,
    ) -> ElementMapResult<String> {
        self.register(element, name, string_ids.to_vec(), overwrite, true)
    }

    /// Register a mapped name built as `prefix + name + postfix`
    ///
    /// Only `name` is ever hashed, never the prefix or postfix. When `name`
    /// is hashed (or empty) the result is purely structural text and is
    /// stored as-is. Without a prefix or postfix this is [`set_element_name`].
    ///
    /// [`set_element_name`]: GeoData::set_element_name
    pub fn compose_element_name(
        &mut self,
        element: &str,
        name: &str,
        prefix: Option<&str>,
        postfix: Option<&str>,
        string_ids: Option<&[StringIdRef]>,
        overwrite: bool,
    ) -> ElementMapResult<String> {
        let prefix = prefix.filter(|p| !p.is_empty());
        let postfix = postfix.filter(|p| !p.is_empty());
        if prefix.is_none() && postfix.is_none() {
            return self.set_element_name(
                element,
                name,
                string_ids.unwrap_or_default(),
                overwrite,
            );
        }
        let Some(type_tag) = element_type_tag(element) else {
            return Err(ElementMapError::InvalidArgument(
                "empty element name".into(),
            ));
        };

        let mut ids = string_ids.map(<[_]>::to_vec).unwrap_or_default();
        let mut composed = String::from(prefix.unwrap_or_default());
        let mut structural = name.is_empty();
        if ids.is_empty() && !name.is_empty() && self.hasher.is_some() {
            composed.push_str(&self.hash_element_name(type_tag, name, &mut ids)?);
            structural = true;
        } else {
            composed.push_str(name);
        }
        composed.push_str(postfix.unwrap_or_default());

        self.register(element, &composed, ids, overwrite, !structural)
    }

    /// Replace this element map with the entries of `source`, each mapped name
    /// wrapped in `prefix` and `postfix`
    ///
    /// Adopts the source hasher when this object has none. Source mapped names
    /// are kept verbatim behind the prefix and never hashed a second time.
    pub fn copy_element_map(
        &mut self,
        source: &GeoData,
        prefix: Option<&str>,
        postfix: Option<&str>,
    ) -> ElementMapResult<()> {
        self.element_map = None;
        self.append_element_map(source, prefix, postfix)
    }

    /// Add the entries of `source` to this element map, following the same
    /// rules as [`copy_element_map`]
    ///
    /// Building a compound from several children appends each child's map
    /// under its own prefix. String ids travel with an entry only when both
    /// objects share one hasher; ids of another hasher mean nothing here.
    ///
    /// [`copy_element_map`]: GeoData::copy_element_map
    pub fn append_element_map(
        &mut self,
        source: &GeoData,
        prefix: Option<&str>,
        postfix: Option<&str>,
    ) -> ElementMapResult<()> {
        let Some(source_map) = source.element_map.clone() else {
            return Ok(());
        };

        if self.hasher.is_none() {
            self.hasher = source.hasher.clone();
        }
        let same_hasher = self.has_same_hasher(source);

        for (mapped, entry) in source_map.iter() {
            let composed = format!(
                "{}{}{}",
                prefix.unwrap_or_default(),
                mapped,
                postfix.unwrap_or_default()
            );
            let string_ids = if same_hasher {
                entry.string_ids.clone()
            } else {
                Vec::new()
            };
            self.register(&entry.original, &composed, string_ids, false, false)?;
        }

        tracing::debug!(
            count = source_map.len(),
            same_hasher,
            "appended element map"
        );
        Ok(())
    }

    /// Store one mapping; `allow_hash` is false for text that is already final
    pub(crate) fn register(
        &mut self,
        element: &str,
        name: &str,
        mut string_ids: Vec<StringIdRef>,
        overwrite: bool,
        allow_hash: bool,
    ) -> ElementMapResult<String> {
        let Some(type_tag) = element_type_tag(element) else {
            return Err(ElementMapError::InvalidArgument(
                "empty element name".into(),
            ));
        };

        if name.is_empty() {
            if self
                .element_map
                .as_ref()
                .is_some_and(|m| m.contains_original(element))
            {
                self.element_map_mut().erase_by_original(element);
                if self.element_map_size() == 0 {
                    self.reset_element_map();
                }
            }
            return Ok(element.to_string());
        }

        let name = is_mapped_element(name).unwrap_or(name);
        if name.is_empty() {
            return Err(ElementMapError::InvalidArgument(format!(
                "empty mapped name for '{}'",
                element
            )));
        }
        let hashed;
        let name = if allow_hash && string_ids.is_empty() && self.hasher.is_some() {
            hashed = self.hash_element_name(type_tag, name, &mut string_ids)?;
            hashed.as_str()
        } else {
            name
        };

        let mapped = self
            .element_map_mut()
            .insert(name, element, string_ids, overwrite)?;
        tracing::trace!("{} -> {}", element, mapped);
        Ok(mapped)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hasher::{HasherOptions, StringHasher};

    #[test]
    fn test_plain_registration_without_hasher() {
        let mut data = GeoData::new();
        let name = data
            .compose_element_name("Face3", "Face3", None, None, None, false)
            .unwrap();
        assert_eq!(name, "Face3");

        let map = data.element_map().unwrap();
        let (original, ids) = map.lookup_by_mapped("Face3").unwrap();
        assert_eq!(original, "Face3");
        assert!(ids.is_empty());
    }

    #[test]
    fn test_hashing_is_content_addressed() {
        let hasher = StringHasher::new().into_shared();
        let data = GeoData::with_hasher(hasher.clone());

        let mut ids = Vec::new();
        assert_eq!(data.hash_element_name('F', "Face3", &mut ids).unwrap(), "#F1");
        assert_eq!(data.hash_element_name('F', "Face3", &mut ids).unwrap(), "#F1");
        assert_eq!(hasher.len(), 1);
        assert_eq!(ids.len(), 2);
        assert_eq!(ids[0], ids[1]);
    }

    #[test]
    fn test_hash_without_hasher_is_identity() {
        let data = GeoData::new();
        let mut ids = Vec::new();
        assert_eq!(data.hash_element_name('E', "Edge1", &mut ids).unwrap(), "Edge1");
        assert!(ids.is_empty());
    }

    #[test]
    fn test_hash_rejects_empty_name() {
        let data = GeoData::with_hasher(StringHasher::new().into_shared());
        let mut ids = Vec::new();
        assert!(matches!(
            data.hash_element_name('F', "", &mut ids),
            Err(ElementMapError::InvalidName(_))
        ));
    }

    #[test]
    fn test_set_element_name_hashes_with_hasher() {
        let mut data = GeoData::with_hasher(StringHasher::new().into_shared());
        let name = data.set_element_name("Face3", "Face3", &[], false).unwrap();
        assert_eq!(name, "#F1");

        let (original, ids) = data.element_map().unwrap().lookup_by_mapped("#F1").unwrap();
        assert_eq!(original, "Face3");
        assert_eq!(ids.len(), 1);
        assert_eq!(ids[0].text(), "Face3");
    }

    #[test]
    fn test_set_element_name_strips_marker() {
        let mut data = GeoData::new();
        let name = data.set_element_name("Edge2", ";E2", &[], false).unwrap();
        assert_eq!(name, "E2");
    }

    #[test]
    fn test_invalid_arguments() {
        let mut data = GeoData::new();
        assert!(matches!(
            data.set_element_name("", "F1", &[], false),
            Err(ElementMapError::InvalidArgument(_))
        ));
        assert!(matches!(
            data.set_element_name("Face1", ";", &[], false),
            Err(ElementMapError::InvalidArgument(_))
        ));
        assert!(matches!(
            data.compose_element_name("", "F1", Some("p"), None, None, false),
            Err(ElementMapError::InvalidArgument(_))
        ));
        assert_eq!(data.element_map_size(), 0);
    }

    #[test]
    fn test_empty_name_erases_by_original() {
        let mut data = GeoData::new();
        data.set_element_name("Face1", "a", &[], false).unwrap();
        data.set_element_name("Face1", "b", &[], false).unwrap();
        data.set_element_name("Face2", "c", &[], false).unwrap();

        let ret = data.set_element_name("Face1", "", &[], false).unwrap();
        assert_eq!(ret, "Face1");
        assert_eq!(data.element_map_size(), 1);
        assert_eq!(data.resolve_forward(";a", None), ";a");
    }

    #[test]
    fn test_erasing_last_mapping_drops_map() {
        let mut data = GeoData::new();
        data.set_element_name("Face1", "a", &[], false).unwrap();
        data.set_element_name("Face1", "", &[], false).unwrap();
        assert!(data.element_map().is_none());
    }

    #[test]
    fn test_short_names_stay_below_threshold() {
        let hasher = StringHasher::with_options(HasherOptions::with_threshold(6)).into_shared();
        let mut data = GeoData::with_hasher(hasher.clone());

        assert_eq!(data.set_element_name("Face3", "Face3", &[], false).unwrap(), "Face3");
        assert_eq!(data.set_element_name("Face12", "Face12", &[], false).unwrap(), "#F1");
        let name = data
            .compose_element_name("Edge1", "Edge1", Some("p_"), None, None, false)
            .unwrap();
        assert_eq!(name, "p_Edge1");
        assert_eq!(hasher.len(), 1);

        let (_, ids) = data.element_map().unwrap().lookup_by_mapped("Face3").unwrap();
        assert!(ids.is_empty());
    }

    #[test]
    fn test_duplicate_and_overwrite() {
        let mut data = GeoData::new();
        data.set_element_name("Face1", "X", &[], false).unwrap();

        let err = data.set_element_name("Face2", "X", &[], false).unwrap_err();
        assert!(matches!(err, ElementMapError::DuplicateMapping { .. }));
        assert_eq!(data.resolve_forward(";X", None), "Face1");

        data.set_element_name("Face2", "X", &[], true).unwrap();
        assert_eq!(data.resolve_forward(";X", None), "Face2");
        assert_eq!(data.resolve_reverse("Face1", None), "Face1");
    }

    #[test]
    fn test_compose_hashes_only_the_name() {
        let hasher = StringHasher::new().into_shared();
        let mut data = GeoData::with_hasher(hasher.clone());

        let name = data
            .compose_element_name("Face3", "Face3", Some("child1_"), Some(":M"), None, false)
            .unwrap();
        assert_eq!(name, "child1_#F1:M");
        // Neither prefix nor postfix reached the hasher
        assert_eq!(hasher.len(), 1);

        let (_, ids) = data.element_map().unwrap().lookup_by_mapped(&name).unwrap();
        assert_eq!(ids.len(), 1);
    }

    #[test]
    fn test_compose_without_hasher() {
        let mut data = GeoData::new();
        let name = data
            .compose_element_name("Edge4", "Edge4", Some("p_"), None, None, false)
            .unwrap();
        assert_eq!(name, "p_Edge4");
    }

    #[test]
    fn test_compose_with_given_ids_keeps_name() {
        let hasher = StringHasher::new().into_shared();
        let sid = hasher.get_id("upstream");
        let mut data = GeoData::with_hasher(hasher.clone());

        let name = data
            .compose_element_name(
                "Face1",
                "#F1",
                Some("a_"),
                None,
                Some(std::slice::from_ref(&sid)),
                false,
            )
            .unwrap();
        assert_eq!(name, "a_#F1");
        assert_eq!(hasher.len(), 1);
        assert_eq!(data.element_map().unwrap().lookup_by_mapped("a_#F1").unwrap().1, &[sid]);
    }

    #[test]
    fn test_structural_composition_is_not_hashed() {
        let hasher = StringHasher::new().into_shared();
        let mut data = GeoData::with_hasher(hasher.clone());

        let name = data
            .compose_element_name("Face1", "", Some("child_#F9"), None, None, false)
            .unwrap();
        assert_eq!(name, "child_#F9");
        assert!(hasher.is_empty());
    }

    #[test]
    fn test_copy_element_map_same_hasher() {
        let hasher = StringHasher::new().into_shared();
        let mut child = GeoData::with_hasher(hasher.clone());
        child.set_element_name("Face1", "Face1", &[], false).unwrap();

        let mut compound = GeoData::with_hasher(hasher.clone());
        compound
            .copy_element_map(&child, Some("c1_"), None)
            .unwrap();

        // The stored ids travel with the entry, so "#F1" is not hashed again
        let map = compound.element_map().unwrap();
        let (original, ids) = map.lookup_by_mapped("c1_#F1").unwrap();
        assert_eq!(original, "Face1");
        assert_eq!(ids.len(), 1);
        assert_eq!(hasher.len(), 1);
    }

    #[test]
    fn test_copy_element_map_different_hasher_keeps_text() {
        let mut child = GeoData::with_hasher(StringHasher::new().into_shared());
        child.set_element_name("Face1", "Face1", &[], false).unwrap();
        child.set_element_name("Edge2", "Edge2", &[], false).unwrap();

        let other = StringHasher::new().into_shared();
        let mut compound = GeoData::with_hasher(other.clone());
        compound
            .copy_element_map(&child, Some("c1_"), Some(":X"))
            .unwrap();

        let names: Vec<String> = compound.element_map_table().into_keys().collect();
        assert_eq!(names, vec!["c1_#E2:X", "c1_#F1:X"]);
        assert!(other.is_empty());
        assert_eq!(compound.resolve_forward(";c1_#F1:X", None), "Face1");
    }

    #[test]
    fn test_copy_unhashed_entries_keep_text() {
        let mut child = GeoData::new();
        child.set_element_name("Face1", "Face1", &[], false).unwrap();

        let other = StringHasher::new().into_shared();
        let mut compound = GeoData::with_hasher(other.clone());
        compound.copy_element_map(&child, Some("c1_"), None).unwrap();

        let names: Vec<String> = compound.element_map_table().into_keys().collect();
        assert_eq!(names, vec!["c1_Face1"]);
        assert!(other.is_empty());
        assert_eq!(compound.resolve_forward(";c1_Face1", None), "Face1");
    }

    #[test]
    fn test_copy_same_hasher_never_rehashes() {
        let hasher = StringHasher::new().into_shared();
        let mut child = GeoData::with_hasher(hasher.clone());
        child.set_element_name("Face1", "Face1", &[], false).unwrap();
        let mut table = child.element_map_table();
        table.insert("E7".into(), "Edge7".into());
        child.set_element_map_table(&table).unwrap();

        let mut compound = GeoData::with_hasher(hasher.clone());
        compound.copy_element_map(&child, Some("c_"), None).unwrap();

        let names: Vec<String> = compound.element_map_table().into_keys().collect();
        assert_eq!(names, vec!["c_#F1", "c_E7"]);
        assert_eq!(hasher.len(), 1);
    }

    #[test]
    fn test_copy_element_map_adopts_hasher() {
        let hasher = StringHasher::new().into_shared();
        let mut child = GeoData::with_hasher(hasher.clone());
        child.set_element_name("Vertex1", "Vertex1", &[], false).unwrap();

        let mut compound = GeoData::new();
        compound.copy_element_map(&child, Some("c_"), None).unwrap();
        assert!(compound.has_same_hasher(&child));
        assert!(compound.element_map().unwrap().contains_mapped("c_#V1"));
    }

    #[test]
    fn test_copy_element_map_replaces_existing() {
        let mut source = GeoData::new();
        source.set_element_name("Face1", "F1", &[], false).unwrap();

        let mut target = GeoData::new();
        target.set_element_name("Face9", "stale", &[], false).unwrap();
        target.copy_element_map(&source, None, None).unwrap();
        assert_eq!(target.element_map_size(), 1);
        assert_eq!(target.resolve_forward(";stale", None), ";stale");

        target.copy_element_map(&GeoData::new(), Some("x"), None).unwrap();
        assert!(target.element_map().is_none());
    }

    #[test]
    fn test_append_builds_compound_union() {
        let hasher = StringHasher::new().into_shared();
        let mut a = GeoData::with_hasher(hasher.clone());
        a.set_element_name("Face1", "Face1", &[], false).unwrap();
        let mut b = GeoData::with_hasher(hasher.clone());
        b.set_element_name("Face1", "Face1", &[], false).unwrap();

        let mut compound = GeoData::with_hasher(hasher);
        compound.copy_element_map(&a, Some("a_"), None).unwrap();
        compound.append_element_map(&b, Some("b_"), None).unwrap();

        let table = compound.element_map_table();
        assert_eq!(table.len(), 2);
        assert_eq!(table["a_#F1"], "Face1");
        assert_eq!(table["b_#F1"], "Face1");
        assert_eq!(compound.element_mapped_names("Face1", false).len(), 2);
    }

    #[test]
    fn test_append_without_prefix_collides() {
        let mut a = GeoData::new();
        a.set_element_name("Face1", "F", &[], false).unwrap();
        let mut b = GeoData::new();
        b.set_element_name("Face2", "F", &[], false).unwrap();

        let mut compound = GeoData::new();
        compound.copy_element_map(&a, None, None).unwrap();
        let err = compound.append_element_map(&b, None, None).unwrap_err();
        assert!(matches!(err, ElementMapError::DuplicateMapping { .. }));
    }
}
