//! Setter groups, requiredness and overload combinations for one class.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::{Arc, Mutex, PoisonError};

use tracing::trace;

use crate::catalog::{ClassDescriptor, MethodDescriptor, Visibility};
use crate::java::JavaType;
use crate::kotlin::KotlinType;
use crate::type_mapper::TypeMapper;

const FIELD_DEPRECATED: &str = "Field is deprecated.";

/// Memoized `@NonNull` field sets keyed by class FQN.
///
/// Safe to share between threads; two classes racing on the first lookup
/// compute the same set.
#[derive(Debug, Default)]
pub struct NonNullCache {
    entries: Mutex<HashMap<String, Arc<BTreeSet<String>>>>,
}

impl NonNullCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, class: &ClassDescriptor) -> Arc<BTreeSet<String>> {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        entries
            .entry(class.fqn.clone())
            .or_insert_with(|| Arc::new(class.non_null_fields()))
            .clone()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// One setter as a generated function sees it.
#[derive(Debug, Clone)]
pub struct Mutator {
    pub property: String,
    pub setter: String,
    pub java_type: JavaType,
    pub kotlin_type: KotlinType,
    /// Assign through Kotlin property syntax instead of calling the setter.
    pub property_access: bool,
    /// Deprecation message when the setter or its field is deprecated.
    pub deprecation: Option<String>,
}

/// All setters of one logical property.
#[derive(Debug, Clone)]
pub struct PropertyGroup {
    pub property: String,
    pub required: bool,
    pub mutators: Vec<Mutator>,
}

impl PropertyGroup {
    pub fn is_overloaded(&self) -> bool {
        self.mutators.len() > 1
    }
}

/// One choice of setter per property group, in parameter order.
#[derive(Debug, Clone)]
pub struct Combination<'a> {
    pub required: Vec<&'a Mutator>,
    pub optional: Vec<&'a Mutator>,
}

impl Combination<'_> {
    pub fn mutators(&self) -> impl Iterator<Item = &Mutator> {
        self.required.iter().chain(&self.optional).copied()
    }
}

#[derive(Debug, Clone)]
pub struct MemberModel {
    pub class_deprecation: Option<String>,
    /// Sorted by property name.
    pub required: Vec<PropertyGroup>,
    /// Sorted by property name.
    pub optional: Vec<PropertyGroup>,
}

impl MemberModel {
    pub fn build(class: &ClassDescriptor, mapper: &TypeMapper, cache: &NonNullCache) -> Self {
        let non_null = cache.get(class);

        let mut groups: BTreeMap<String, Vec<Mutator>> = BTreeMap::new();
        for method in class.methods.iter().filter(|m| is_setter(m)) {
            let Some(property) = property_name(&method.name) else {
                continue;
            };
            let (_, java_type) = &method.params[0];
            let kotlin_type = mapper.map(java_type);

            let mutators = groups.entry(property.clone()).or_default();
            if mutators.iter().any(|m| m.kotlin_type == kotlin_type) {
                trace!(class = %class.fqn, setter = %method.name, "Dropping overload with a duplicate Kotlin type");
                continue;
            }

            let field = class.field(&property);
            let property_access = field.is_some_and(|f| f.ty.erasure() == java_type.erasure());
            let field_deprecated = field.is_some_and(|f| f.deprecated);
            let deprecation = (method.deprecated || field_deprecated).then(|| {
                method
                    .deprecation_note
                    .clone()
                    .or_else(|| field.and_then(|f| f.deprecation_note.clone()))
                    .unwrap_or_else(|| FIELD_DEPRECATED.to_string())
            });

            mutators.push(Mutator {
                property,
                setter: method.name.clone(),
                java_type: java_type.clone(),
                kotlin_type,
                property_access,
                deprecation,
            });
        }

        let (required, optional) = groups
            .into_iter()
            .map(|(property, mutators)| PropertyGroup {
                required: non_null.contains(&property),
                property,
                mutators,
            })
            .partition(|g| g.required);

        Self {
            class_deprecation: class.deprecation.clone(),
            required,
            optional,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.required.is_empty() && self.optional.is_empty()
    }

    /// Every legal setter selection, in cartesian-product order over the
    /// groups (required first, then optional, each by property name).
    /// Without overloads this is exactly one combination.
    pub fn combinations(&self) -> Vec<Combination<'_>> {
        let lists: Vec<Vec<&Mutator>> = self
            .required
            .iter()
            .chain(&self.optional)
            .map(|g| g.mutators.iter().collect())
            .collect();
        let split = self.required.len();

        cartesian_product(&lists)
            .into_iter()
            .map(|mut selection| {
                let optional = selection.split_off(split);
                Combination {
                    required: selection,
                    optional,
                }
            })
            .collect()
    }

    /// Function-level deprecation note for one combination.
    pub fn deprecation_for(&self, combination: &Combination<'_>) -> Option<String> {
        let deprecated: Vec<String> = combination
            .mutators()
            .filter_map(|m| {
                m.deprecation
                    .as_deref()
                    .map(|message| format!("- '{}': {message}", m.property))
            })
            .collect();

        let mut lines: Vec<String> = self.class_deprecation.iter().cloned().collect();
        if !deprecated.is_empty() {
            lines.push("This function uses deprecated parameters:".to_string());
            lines.extend(deprecated);
        }
        (!lines.is_empty()).then(|| lines.join("\n"))
    }
}

/// All ways of picking one element from each list, first list varying
/// slowest. The product of no lists is one empty selection.
pub fn cartesian_product<T: Clone>(lists: &[Vec<T>]) -> Vec<Vec<T>> {
    lists.iter().fold(vec![Vec::new()], |acc, list| {
        acc.iter()
            .flat_map(|prefix| {
                list.iter().map(move |item| {
                    let mut next = prefix.clone();
                    next.push(item.clone());
                    next
                })
            })
            .collect()
    })
}

fn is_setter(method: &MethodDescriptor) -> bool {
    method.visibility == Visibility::Public
        && !method.is_static
        && method.params.len() == 1
        && method.name.len() > 3
        && method.name.starts_with("set")
}

/// `setChatId` → `chatId`.
pub(crate) fn property_name(setter: &str) -> Option<String> {
    let rest = setter.strip_prefix("set")?;
    let mut chars = rest.chars();
    let first = chars.next()?;
    Some(first.to_lowercase().chain(chars).collect())
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;
    use crate::java::parse_source;
    use crate::source_index::SourceIndex;

    fn class(source: &str, fqn: &str) -> ClassDescriptor {
        let unit = parse_source(&PathBuf::from("T.java"), &PathBuf::from("."), source).unwrap();
        let index = SourceIndex::from_units(Vec::new(), vec![unit]);
        ClassDescriptor::build(&index, fqn).unwrap()
    }

    #[test]
    fn product_of_nothing_is_one_empty_selection() {
        let empty: Vec<Vec<u8>> = Vec::new();
        assert_eq!(cartesian_product(&empty), vec![Vec::<u8>::new()]);
        let product = cartesian_product(&[vec![1, 2], vec![3], vec![4, 5]]);
        assert_eq!(product, vec![vec![1, 3, 4], vec![1, 3, 5], vec![2, 3, 4], vec![2, 3, 5]]);
    }

    #[test]
    fn partitions_required_and_optional_sorted() {
        let class = class(
            r#"
            package p;
            @Data
            public class Poll {
                @NonNull private String question;
                @NonNull private String chatId;
                private Integer openPeriod;
                private Boolean isAnonymous;
            }
            "#,
            "p.Poll",
        );
        let cache = NonNullCache::new();
        let model = MemberModel::build(&class, &TypeMapper::new(), &cache);
        let required: Vec<_> = model.required.iter().map(|g| g.property.as_str()).collect();
        let optional: Vec<_> = model.optional.iter().map(|g| g.property.as_str()).collect();
        assert_eq!(required, vec!["chatId", "question"]);
        assert_eq!(optional, vec!["isAnonymous", "openPeriod"]);
        assert!(model.required.iter().all(|g| g.mutators[0].property_access));
        assert_eq!(model.combinations().len(), 1);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn overloads_multiply_and_same_kotlin_types_collapse() {
        let class = class(
            r#"
            package p;
            public class Media {
                private Integer x;
                public void setX(Integer x) { this.x = x; }
                public void setX(String x) { this.x = Integer.parseInt(x); }
                public void setX(int x) { this.x = x; }
                public void setY(long y) { }
                public void setY(String y) { }
            }
            "#,
            "p.Media",
        );
        let model = MemberModel::build(&class, &TypeMapper::new(), &NonNullCache::new());
        assert_eq!(model.optional[0].mutators.len(), 2);
        let combinations = model.combinations();
        assert_eq!(combinations.len(), 4);

        let signatures: BTreeSet<Vec<String>> = combinations
            .iter()
            .map(|c| c.mutators().map(|m| m.java_type.erasure()).collect())
            .collect();
        assert_eq!(signatures.len(), 4);
        assert!(model.optional[0].mutators[0].property_access);
        assert!(!model.optional[0].mutators[1].property_access);
    }

    #[test]
    fn deprecation_lists_class_and_every_selected_setter() {
        let class = class(
            r#"
            package p;
            /** @deprecated Use SendThing instead */
            @Deprecated
            @Data
            public class Old {
                /** @deprecated use chat */
                @Deprecated
                @NonNull private String chatId;
                @Deprecated
                private String reply;
                private String text;
            }
            "#,
            "p.Old",
        );
        let model = MemberModel::build(&class, &TypeMapper::new(), &NonNullCache::new());
        let combinations = model.combinations();
        assert_eq!(
            model.deprecation_for(&combinations[0]).unwrap(),
            "Use SendThing instead\nThis function uses deprecated parameters:\n\
             - 'chatId': use chat\n- 'reply': Field is deprecated."
        );
    }

    #[test]
    fn property_name_decapitalizes() {
        assert_eq!(property_name("setChatId").as_deref(), Some("chatId"));
        assert_eq!(property_name("set"), None);
        assert_eq!(property_name("getChatId"), None);
    }
}
