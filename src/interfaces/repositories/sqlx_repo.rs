use sqlx::PgPool;

#[derive(Clone)]
pub struct SqlxArticleRepo {
    pub pool: PgPool,
}

#[derive(Clone)]
pub struct SqlxImageRepo {
    pub pool: PgPool,
}

#[derive(Clone)]
pub struct SqlxUserRepo {
    pub pool: PgPool,
}

/// Resolves polymorphic owner keys against whichever table the tag names.
#[derive(Clone)]
pub struct SqlxOwnerRepo {
    pub pool: PgPool,
}
