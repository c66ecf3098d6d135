use super::{
    DefaultJoinTableHandler, JoinTableSide, RelationKind, Relationship, StructField, TagSettings,
};
use crate::record::{FieldDef, FieldTy, ModelDef};
use crate::stmt::Type;
use crate::ModelType;

use std::sync::Arc;
use std_util::str;

/// Mapping metadata for one record type.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelStruct {
    pub model_type: ModelType,

    /// Type name, e.g. `UserProfile`.
    pub name: &'static str,

    pub table_name: String,

    /// Fields in declaration order.
    pub fields: Vec<StructField>,

    primary_key: Option<usize>,
    deleted_at: Option<usize>,
}

impl ModelStruct {
    pub(crate) fn build(model_type: ModelType, singular_table: bool) -> ModelStruct {
        let def = model_type.def();
        let primary_key_name = primary_key_of(&def).map(|field| field.name);

        let fields: Vec<_> = def
            .fields
            .iter()
            .map(|field| {
                let settings = TagSettings::parse(field.tag);
                let db_name = column_name(field, &settings);

                match field.ty {
                    FieldTy::Primitive { ty, nullable } => {
                        let primary_key = Some(field.name) == primary_key_name;
                        let generate_uuid = settings.contains("AUTO_UUID");
                        let auto_increment = match settings.get("AUTO_INCREMENT") {
                            Some(flag) => !flag.eq_ignore_ascii_case("false"),
                            None => primary_key && ty.is_integer() && !generate_uuid,
                        };

                        StructField {
                            name: field.name,
                            db_name,
                            ty: Some(ty),
                            nullable,
                            settings,
                            primary_key,
                            auto_increment,
                            generate_uuid,
                            relationship: None,
                        }
                    }
                    FieldTy::Relation { many, target } => StructField {
                        name: field.name,
                        db_name,
                        ty: None,
                        nullable: true,
                        relationship: classify(&def, field, &settings, many, target, singular_table),
                        settings,
                        primary_key: false,
                        auto_increment: false,
                        generate_uuid: false,
                    },
                }
            })
            .collect();

        let primary_key = fields.iter().position(|field| field.primary_key);
        let deleted_at = fields.iter().position(|field| {
            field.is_normal()
                && (field.settings.contains("DELETED_AT")
                    || (field.name == "deleted_at" && field.nullable))
        });

        ModelStruct {
            model_type,
            name: def.name,
            table_name: table_name_of(&def, singular_table),
            fields,
            primary_key,
            deleted_at,
        }
    }

    pub fn primary_field(&self) -> Option<&StructField> {
        self.primary_key.map(|index| &self.fields[index])
    }

    /// The soft-delete marker field, if the type declares one.
    pub fn deleted_at_field(&self) -> Option<&StructField> {
        self.deleted_at.map(|index| &self.fields[index])
    }

    /// Looks a field up by field name or column name.
    pub fn field(&self, name: &str) -> Option<&StructField> {
        self.fields
            .iter()
            .find(|field| field.name == name)
            .or_else(|| self.fields.iter().find(|field| field.db_name == name))
    }

    /// Fields stored in columns.
    pub fn normal_fields(&self) -> impl Iterator<Item = &StructField> {
        self.fields.iter().filter(|field| field.is_normal())
    }

    /// Relation fields that were classified.
    pub fn relationships(&self) -> impl Iterator<Item = (&StructField, &Relationship)> {
        self.fields
            .iter()
            .filter_map(|field| Some((field, field.relationship.as_ref()?)))
    }
}

fn table_name_of(def: &ModelDef, singular_table: bool) -> String {
    match def.table_name {
        Some(table_name) => table_name.to_string(),
        None => str::table_name(def.name, singular_table),
    }
}

fn column_name(field: &FieldDef, settings: &TagSettings) -> String {
    match settings.get("COLUMN") {
        Some(column) => column.to_string(),
        None => str::snake_case(field.name),
    }
}

/// A field tagged `PRIMARY_KEY`, else a field named `id`.
fn primary_key_of(def: &ModelDef) -> Option<&FieldDef> {
    let primitives = || {
        def.fields
            .iter()
            .filter(|field| matches!(field.ty, FieldTy::Primitive { .. }))
    };

    primitives()
        .find(|field| TagSettings::parse(field.tag).contains("PRIMARY_KEY"))
        .or_else(|| primitives().find(|field| field.name == "id"))
}

/// Finds a primitive field by field name or column name.
fn primitive_field<'a>(def: &'a ModelDef, name: &str) -> Option<(&'a FieldDef, String, Type)> {
    def.fields.iter().find_map(|field| {
        let FieldTy::Primitive { ty, .. } = field.ty else {
            return None;
        };
        let column = column_name(field, &TagSettings::parse(field.tag));
        (field.name == name || column == name).then_some((field, column, ty))
    })
}

fn key_of(def: &ModelDef) -> Option<(&FieldDef, String, Type)> {
    let field = primary_key_of(def)?;
    primitive_field(def, field.name)
}

fn classify(
    owner: &ModelDef,
    field: &FieldDef,
    settings: &TagSettings,
    many: bool,
    target: ModelType,
    singular_table: bool,
) -> Option<Relationship> {
    let target_def = target.def();
    let owner_prefix = str::snake_case(owner.name);

    if let Some(join_table) = settings.get("MANY2MANY") {
        if !many {
            return None;
        }

        let (owner_key, owner_key_column, owner_key_type) = key_of(owner)?;
        let (target_key, target_key_column, target_key_type) = key_of(&target_def)?;

        let foreign_column = settings
            .get("FOREIGNKEY")
            .map(String::from)
            .unwrap_or_else(|| format!("{owner_prefix}_{owner_key_column}"));
        let association_column = settings
            .get("ASSOCIATIONFOREIGNKEY")
            .map(String::from)
            .unwrap_or_else(|| {
                format!("{}_{target_key_column}", str::snake_case(target_def.name))
            });

        let handler = DefaultJoinTableHandler::new(
            join_table,
            JoinTableSide {
                table: table_name_of(owner, singular_table),
                key_column: owner_key_column,
                join_column: foreign_column.clone(),
                key_type: owner_key_type,
            },
            JoinTableSide {
                table: table_name_of(&target_def, singular_table),
                key_column: target_key_column,
                join_column: association_column.clone(),
                key_type: target_key_type,
            },
        );

        return Some(Relationship {
            kind: RelationKind::ManyToMany,
            target,
            foreign_field: owner_key.name.to_string(),
            foreign_column,
            association_field: target_key.name.to_string(),
            association_column,
            join_table: Some(Arc::new(handler)),
        });
    }

    let owner_key = key_of(owner);

    // has-one / has-many: the associated type holds the key
    if let Some((owner_key, owner_key_column, _)) = &owner_key {
        let foreign_name = settings
            .get("FOREIGNKEY")
            .map(String::from)
            .unwrap_or_else(|| format!("{owner_prefix}_{}", owner_key.name));

        if let Some((foreign, foreign_column, _)) = primitive_field(&target_def, &foreign_name) {
            let (association_field, association_column) =
                match settings.get("ASSOCIATIONFOREIGNKEY") {
                    Some(name) => {
                        let (field, column, _) = primitive_field(owner, name)?;
                        (field.name.to_string(), column)
                    }
                    None => (owner_key.name.to_string(), owner_key_column.clone()),
                };

            return Some(Relationship {
                kind: if many {
                    RelationKind::HasMany
                } else {
                    RelationKind::HasOne
                },
                target,
                foreign_field: foreign.name.to_string(),
                foreign_column,
                association_field,
                association_column,
                join_table: None,
            });
        }
    }

    if many {
        return None;
    }

    // belongs-to: the owner holds the key
    let (target_key, target_key_column, _) = key_of(&target_def)?;
    let foreign_name = settings
        .get("FOREIGNKEY")
        .map(String::from)
        .unwrap_or_else(|| format!("{}_{}", field.name, target_key.name));
    let (foreign, foreign_column, _) = primitive_field(owner, &foreign_name)?;

    let (association_field, association_column) = match settings.get("ASSOCIATIONFOREIGNKEY") {
        Some(name) => {
            let (field, column, _) = primitive_field(&target_def, name)?;
            (field.name.to_string(), column)
        }
        None => (target_key.name.to_string(), target_key_column),
    };

    Some(Relationship {
        kind: RelationKind::BelongsTo,
        target,
        foreign_field: foreign.name.to_string(),
        foreign_column,
        association_field,
        association_column,
        join_table: None,
    })
}
