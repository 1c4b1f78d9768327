/// Relationship resolution for bidirectional associations
///
/// Builds, once per request, the map from each principal table to the
/// foreign keys that reference it, and decides which inverse collections a
/// principal model can actually carry.

use indexmap::IndexMap;
use std::collections::HashSet;

use crate::codegen::types::TableDefinition;
use crate::codegen::utils::{collection_name, to_pascal_case};

/// One incoming foreign key on a principal table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InverseRelationshipInfo {
    pub referencing_table: String,
    pub foreign_key_property: String,
    pub navigation_property: Option<String>,
    pub collection_name: String,
}

/// Principal table name -> incoming foreign keys, in table/property order
pub type RelationshipMap = IndexMap<String, Vec<InverseRelationshipInfo>>;

/// Resolve inverse relationships over the valid tables
///
/// Dangling references are recorded like any other; principals without
/// incoming keys get no entry at all.
pub fn resolve_relationships(tables: &[TableDefinition]) -> RelationshipMap {
    let mut map = RelationshipMap::new();

    for table in tables {
        if table.name.trim().is_empty() {
            continue;
        }

        for prop in &table.properties {
            if let Some(principal) = prop.principal() {
                map.entry(principal.to_string())
                    .or_insert_with(Vec::new)
                    .push(InverseRelationshipInfo {
                        referencing_table: table.name.clone(),
                        foreign_key_property: prop.name.clone(),
                        navigation_property: prop.navigation().map(str::to_string),
                        collection_name: collection_name(&to_pascal_case(&table.name)),
                    });
            }
        }
    }

    map
}

/// Outcome for one inverse collection on a principal model
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CollectionSlot {
    Emitted(InverseRelationshipInfo),
    Skipped(InverseRelationshipInfo),
}

impl CollectionSlot {
    pub fn info(&self) -> &InverseRelationshipInfo {
        match self {
            CollectionSlot::Emitted(info) | CollectionSlot::Skipped(info) => info,
        }
    }
}

/// Decide which inverse collections `principal` can carry
///
/// A collection is skipped when its name collides with a property, a
/// declared navigation, or a collection already placed on the same model.
pub fn plan_collections(principal: &TableDefinition, relationships: &RelationshipMap) -> Vec<CollectionSlot> {
    let Some(entries) = relationships.get(&principal.name) else {
        return Vec::new();
    };

    // Members may not share the enclosing type's name
    let mut taken: HashSet<String> = HashSet::from([to_pascal_case(&principal.name)]);
    for prop in &principal.properties {
        taken.insert(to_pascal_case(&prop.name));
        if let Some(nav) = prop.navigation() {
            taken.insert(to_pascal_case(nav));
        }
    }

    entries
        .iter()
        .map(|entry| {
            if taken.insert(entry.collection_name.clone()) {
                CollectionSlot::Emitted(entry.clone())
            } else {
                CollectionSlot::Skipped(entry.clone())
            }
        })
        .collect()
}

/// Collection on the principal side that an association should bind to
///
/// `None` when the principal is absent from the request or its collection
/// was skipped; the association is then an unnamed one-to-many.
pub fn inverse_collection_for(
    tables: &[TableDefinition],
    relationships: &RelationshipMap,
    dependent: &TableDefinition,
    foreign_key_property: &str,
    principal: &str,
) -> Option<String> {
    let principal_table = tables.iter().find(|t| t.name == principal)?;

    plan_collections(principal_table, relationships)
        .into_iter()
        .find_map(|slot| match slot {
            CollectionSlot::Emitted(info)
                if info.referencing_table == dependent.name
                    && info.foreign_key_property == foreign_key_property =>
            {
                Some(info.collection_name)
            }
            _ => None,
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codegen::types::{DataType, PropertyDefinition};

    fn products_and_orders() -> Vec<TableDefinition> {
        vec![
            TableDefinition::new("Products", vec![PropertyDefinition::key("Id", DataType::Integer32)]),
            TableDefinition::new(
                "Orders",
                vec![
                    PropertyDefinition::key("OrderId", DataType::Integer32),
                    PropertyDefinition::reference("ProductId", DataType::Integer32, "Products", "Id")
                        .required()
                        .with_navigation("Product"),
                ],
            ),
        ]
    }

    #[test]
    fn test_resolve_single_reference() {
        let map = resolve_relationships(&products_and_orders());

        assert_eq!(map.len(), 1);
        let entries = &map["Products"];
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].referencing_table, "Orders");
        assert_eq!(entries[0].foreign_key_property, "ProductId");
        assert_eq!(entries[0].collection_name, "Orders");
        assert!(!map.contains_key("Orders"));
    }

    #[test]
    fn test_multiple_references_produce_multiple_entries() {
        let tables = vec![
            TableDefinition::new("Users", vec![PropertyDefinition::key("Id", DataType::Integer32)]),
            TableDefinition::new(
                "Message",
                vec![
                    PropertyDefinition::key("Id", DataType::Integer32),
                    PropertyDefinition::reference("SenderId", DataType::Integer32, "Users", "Id"),
                    PropertyDefinition::reference("RecipientId", DataType::Integer32, "Users", "Id"),
                ],
            ),
        ];

        let map = resolve_relationships(&tables);
        let entries = &map["Users"];
        assert_eq!(entries.len(), 2);
        assert!(entries.iter().all(|e| e.collection_name == "Messages"));

        let plan = plan_collections(&tables[0], &map);
        assert!(matches!(plan[0], CollectionSlot::Emitted(_)));
        assert!(matches!(plan[1], CollectionSlot::Skipped(_)));
    }

    #[test]
    fn test_dangling_reference_is_kept() {
        let tables = vec![TableDefinition::new(
            "Orders",
            vec![
                PropertyDefinition::key("Id", DataType::Integer32),
                PropertyDefinition::reference("CustomerId", DataType::Integer32, "Customers", "Id"),
            ],
        )];

        let map = resolve_relationships(&tables);
        assert_eq!(map["Customers"][0].referencing_table, "Orders");
        assert_eq!(
            inverse_collection_for(&tables, &map, &tables[0], "CustomerId", "Customers"),
            None
        );
    }

    #[test]
    fn test_collision_with_existing_member_is_skipped() {
        let mut tables = products_and_orders();
        tables[0].properties.push(PropertyDefinition::new("Orders", DataType::Text));

        let map = resolve_relationships(&tables);
        let plan = plan_collections(&tables[0], &map);
        assert!(matches!(plan[0], CollectionSlot::Skipped(_)));
        assert_eq!(
            inverse_collection_for(&tables, &map, &tables[1], "ProductId", "Products"),
            None
        );
    }

    #[test]
    fn test_self_reference_cannot_reuse_type_name() {
        let tables = vec![TableDefinition::new(
            "Employees",
            vec![
                PropertyDefinition::key("Id", DataType::Integer32),
                PropertyDefinition::reference("ManagerId", DataType::Integer32, "Employees", "Id"),
            ],
        )];

        let map = resolve_relationships(&tables);
        assert!(matches!(plan_collections(&tables[0], &map)[0], CollectionSlot::Skipped(_)));
    }

    #[test]
    fn test_inverse_collection_lookup() {
        let tables = products_and_orders();
        let map = resolve_relationships(&tables);
        assert_eq!(
            inverse_collection_for(&tables, &map, &tables[1], "ProductId", "Products"),
            Some("Orders".to_string())
        );
    }
}
