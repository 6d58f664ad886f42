// src/services/catalog_service.rs

use rust_decimal::Decimal;
use serde_json::json;
use sqlx::PgPool;

use crate::{
    common::error::AppError,
    db::CatalogRepository,
    models::catalog::{
        Classification, ClassificationKind, Lifecycle, Product, ProductColor, ProductDraft,
        ProductSize, StockEntry, StockView,
    },
};

/// Converte as listas de talles e cores; qualquer valor fora do catálogo
/// rejeita a requisição inteira antes de qualquer escrita.
pub fn parse_variants(
    sizes: &[String],
    colors: &[String],
) -> Result<(Vec<ProductSize>, Vec<ProductColor>), AppError> {
    let mut invalid_sizes = Vec::new();
    let mut invalid_colors = Vec::new();
    let mut parsed_sizes = Vec::new();
    let mut parsed_colors = Vec::new();

    for raw in sizes {
        match ProductSize::parse(raw) {
            Some(size) if !parsed_sizes.contains(&size) => parsed_sizes.push(size),
            Some(_) => {}
            None => invalid_sizes.push(raw.clone()),
        }
    }
    for raw in colors {
        match ProductColor::parse(raw) {
            Some(color) if !parsed_colors.contains(&color) => parsed_colors.push(color),
            Some(_) => {}
            None => invalid_colors.push(raw.clone()),
        }
    }

    if !invalid_sizes.is_empty() || !invalid_colors.is_empty() {
        return Err(AppError::business(
            "Talles o colores inválidos.",
            json!({
                "invalidSizes": invalid_sizes,
                "invalidColors": invalid_colors,
                "validSizes": ProductSize::ALL.iter().map(|s| s.label()).collect::<Vec<_>>(),
                "validColors": ProductColor::ALL.iter().map(|c| c.label()).collect::<Vec<_>>(),
            }),
        ));
    }
    Ok((parsed_sizes, parsed_colors))
}

/// Produto cartesiano talles × cores.
pub fn expand_combinations(
    sizes: &[ProductSize],
    colors: &[ProductColor],
) -> Vec<(ProductSize, ProductColor)> {
    sizes
        .iter()
        .flat_map(|size| colors.iter().map(move |color| (*size, *color)))
        .collect()
}

// Dados brutos de produto vindos do handler (talles/cores ainda como texto).
#[derive(Debug, Clone)]
pub struct ProductInput {
    pub name: String,
    pub unit_cost: Decimal,
    pub state: Option<Lifecycle>,
    pub sizes: Vec<String>,
    pub colors: Vec<String>,
    pub product_type_id: Option<i64>,
    pub team_id: Option<i64>,
}

#[derive(Clone)]
pub struct CatalogService {
    catalog_repo: CatalogRepository,
    pool: PgPool,
}

impl CatalogService {
    pub fn new(catalog_repo: CatalogRepository, pool: PgPool) -> Self {
        Self { catalog_repo, pool }
    }

    // --- PRODUTOS ---

    pub async fn list_products(&self) -> Result<Vec<Product>, AppError> {
        self.catalog_repo.list_active_products().await
    }

    pub async fn get_product(&self, id: i64) -> Result<Product, AppError> {
        self.catalog_repo
            .find_product(&self.pool, id)
            .await?
            .ok_or_else(|| AppError::NotFound("Producto no encontrado.".to_string()))
    }

    pub async fn create_product(&self, input: ProductInput) -> Result<Product, AppError> {
        let draft = self.build_draft(input).await?;
        let product = self.catalog_repo.create_product(&self.pool, &draft).await?;
        tracing::info!("Produto {} criado", product.id);
        Ok(product)
    }

    pub async fn update_product(&self, id: i64, input: ProductInput) -> Result<Product, AppError> {
        let draft = self.build_draft(input).await?;
        self.catalog_repo
            .update_product(&self.pool, id, &draft)
            .await?
            .ok_or_else(|| AppError::NotFound("Producto no encontrado.".to_string()))
    }

    pub async fn deactivate_product(&self, id: i64) -> Result<(), AppError> {
        if !self.catalog_repo.deactivate_product(&self.pool, id).await? {
            return Err(AppError::NotFound("Producto no encontrado.".to_string()));
        }
        Ok(())
    }

    async fn build_draft(&self, input: ProductInput) -> Result<ProductDraft, AppError> {
        let (sizes, colors) = parse_variants(&input.sizes, &input.colors)?;

        if let Some(type_id) = input.product_type_id {
            self.ensure_classification(ClassificationKind::ProductType, type_id).await?;
        }
        if let Some(team_id) = input.team_id {
            self.ensure_classification(ClassificationKind::Team, team_id).await?;
        }

        Ok(ProductDraft {
            name: input.name.trim().to_string(),
            unit_cost: input.unit_cost,
            state: input.state.unwrap_or(Lifecycle::Active),
            sizes,
            colors,
            product_type_id: input.product_type_id,
            team_id: input.team_id,
        })
    }

    async fn ensure_classification(&self, kind: ClassificationKind, id: i64) -> Result<(), AppError> {
        match self.catalog_repo.find_classification(&self.pool, kind, id).await? {
            Some(_) => Ok(()),
            None => Err(AppError::ReferenceNotFound(format!(
                "{} {} no encontrado.",
                kind.display_name(),
                id
            ))),
        }
    }

    // --- TIPOS DE PRODUTO / EQUIPES ---

    pub async fn list_classifications(&self, kind: ClassificationKind) -> Result<Vec<Classification>, AppError> {
        self.catalog_repo.list_active_classifications(kind).await
    }

    pub async fn get_classification(&self, kind: ClassificationKind, id: i64) -> Result<Classification, AppError> {
        self.catalog_repo
            .find_classification(&self.pool, kind, id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("{} no encontrado.", kind.display_name())))
    }

    pub async fn create_classification(&self, kind: ClassificationKind, name: &str) -> Result<Classification, AppError> {
        self.catalog_repo
            .create_classification(&self.pool, kind, name.trim())
            .await
    }

    pub async fn update_classification(
        &self,
        kind: ClassificationKind,
        id: i64,
        name: Option<&str>,
        state: Option<Lifecycle>,
    ) -> Result<Classification, AppError> {
        let current = self.get_classification(kind, id).await?;
        let name = name.map(str::trim).unwrap_or(current.name.as_str());
        let state = state.unwrap_or(current.state);

        self.catalog_repo
            .update_classification(&self.pool, kind, id, name, state)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("{} no encontrado.", kind.display_name())))
    }

    pub async fn deactivate_classification(&self, kind: ClassificationKind, id: i64) -> Result<(), AppError> {
        if !self.catalog_repo.deactivate_classification(&self.pool, kind, id).await? {
            return Err(AppError::NotFound(format!("{} no encontrado.", kind.display_name())));
        }
        Ok(())
    }

    // --- ESTOQUE ---

    pub async fn list_stock(&self) -> Result<Vec<StockView>, AppError> {
        self.catalog_repo.list_stock().await
    }

    pub async fn stock_for_product(&self, product_id: i64) -> Result<Vec<StockView>, AppError> {
        self.get_product(product_id).await?;
        self.catalog_repo.list_stock_for_product(product_id).await
    }

    /// Soma `quantity` em cada combinação talle × cor do produto.
    pub async fn add_stock(
        &self,
        product_id: i64,
        sizes: &[String],
        colors: &[String],
        quantity: i32,
    ) -> Result<Vec<StockEntry>, AppError> {
        // 1. Validação completa antes de qualquer escrita
        let (sizes, colors) = parse_variants(sizes, colors)?;
        let combinations = expand_combinations(&sizes, &colors);
        if combinations.is_empty() {
            return Err(AppError::BadRequest(
                "Debe indicar al menos un talle y un color.".to_string(),
            ));
        }

        let mut tx = self.pool.begin().await?;

        if self.catalog_repo.find_product(&mut *tx, product_id).await?.is_none() {
            return Err(AppError::ReferenceNotFound("Producto no encontrado.".to_string()));
        }

        // 2. Upsert de cada combinação na mesma transação
        let mut entries = Vec::with_capacity(combinations.len());
        for (size, color) in combinations {
            let entry = self.catalog_repo
                .add_stock(&mut *tx, product_id, size, color, quantity)
                .await?;
            entries.push(entry);
        }

        tx.commit().await?;

        tracing::info!(
            "📦 Estoque adicionado: produto {} (+{} em {} variantes)",
            product_id,
            quantity,
            entries.len()
        );
        Ok(entries)
    }

    pub async fn set_stock_quantity(&self, stock_id: i64, quantity: i32) -> Result<StockEntry, AppError> {
        self.catalog_repo
            .set_stock_quantity(&self.pool, stock_id, quantity)
            .await?
            .ok_or_else(|| AppError::NotFound("Registro de stock no encontrado.".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[test]
    fn fans_out_over_every_size_and_color() {
        let (sizes, colors) =
            parse_variants(&strings(&["M", "xl"]), &strings(&["Azul", "negro", "Rojo"])).unwrap();
        let combinations = expand_combinations(&sizes, &colors);

        assert_eq!(combinations.len(), 6);
        assert!(combinations.contains(&(ProductSize::Xl, ProductColor::Negro)));
        assert!(combinations.contains(&(ProductSize::M, ProductColor::Rojo)));
    }

    #[test]
    fn duplicated_values_collapse() {
        let (sizes, colors) = parse_variants(&strings(&["M", "m"]), &strings(&["Azul"])).unwrap();
        assert_eq!(sizes, vec![ProductSize::M]);
        assert_eq!(expand_combinations(&sizes, &colors).len(), 1);
    }

    #[test]
    fn any_invalid_value_rejects_the_whole_request() {
        let err = parse_variants(&strings(&["M", "XS"]), &strings(&["Azul", "Fucsia"])).unwrap_err();
        match err {
            AppError::BusinessRule { details, .. } => {
                assert_eq!(details["invalidSizes"], json!(["XS"]));
                assert_eq!(details["invalidColors"], json!(["Fucsia"]));
            }
            other => panic!("erro inesperado: {other:?}"),
        }
    }

    #[test]
    fn empty_lists_expand_to_nothing() {
        let (sizes, colors) = parse_variants(&[], &strings(&["Azul"])).unwrap();
        assert!(expand_combinations(&sizes, &colors).is_empty());
    }
}
