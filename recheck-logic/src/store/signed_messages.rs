use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "signed_messages")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub emitter_chain: i32,
    #[sea_orm(primary_key, auto_increment = false)]
    pub emitter_address: Vec<u8>,
    #[sea_orm(primary_key, auto_increment = false)]
    pub sequence: i64,
    pub data: Vec<u8>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
