//! End-to-end recipe lifecycle against the in-memory row store.

use std::sync::Arc;

use myllah_core::mapper::columns;
use myllah_core::{
    Difficulty, Ingredient, MealType, MemoryRowStore, Property, RecipeCreate, RecipeError,
    RecipeSearchFilters, RecipeService, RecipeUpdate, Row, RowStore, StepInput, Unit,
    RECIPE_PARTITION_KEY,
};

fn setup() -> (RecipeService, Arc<MemoryRowStore>) {
    let store = Arc::new(MemoryRowStore::new());
    (RecipeService::new(store.clone()), store)
}

fn tarte() -> RecipeCreate {
    RecipeCreate {
        title: "Tarte".to_string(),
        description: Some("Tarte aux pommes de saison".to_string()),
        difficulty: Difficulty::Easy,
        meal_type: vec![MealType::Dessert],
        tags: Some(vec![
            "  Dessert ".to_string(),
            "DESSERT".to_string(),
            "sucré".to_string(),
        ]),
        prep_time_minutes: Some(20),
        cook_time_minutes: Some(40),
        servings: Some(6),
        ingredients: vec![
            Ingredient {
                name: "Pomme".to_string(),
                quantity: 4.0,
                unit: Unit::Piece,
            },
            Ingredient {
                name: "Pâte brisée".to_string(),
                quantity: 1.0,
                unit: Unit::Piece,
            },
        ],
        steps: vec![
            "Éplucher les pommes".to_string(),
            "Garnir la pâte".to_string(),
            "Cuire 40 minutes".to_string(),
        ],
        main_image_url: None,
        additional_images: Vec::new(),
    }
}

#[tokio::test]
async fn test_create_get_update_delete() {
    let (service, _store) = setup();

    let created = service.create(tarte()).await.unwrap();
    assert_eq!(created.total_time_minutes, 60);
    assert_eq!(created.tags, vec!["dessert", "sucré"]);
    assert_eq!(created.created_at, created.updated_at);

    let fetched = service.get(&created.id).await.unwrap().unwrap();
    assert_eq!(fetched, created);

    let update = RecipeUpdate {
        cook_time_minutes: Some(10),
        ..Default::default()
    };
    let updated = service.update(&created.id, update).await.unwrap().unwrap();
    assert_eq!(updated.prep_time_minutes, Some(20));
    assert_eq!(updated.cook_time_minutes, Some(10));
    assert_eq!(updated.total_time_minutes, 30);
    assert_eq!(updated.title, "Tarte");
    assert_eq!(updated.created_at, created.created_at);
    assert!(updated.updated_at >= created.updated_at);

    let refetched = service.get(&created.id).await.unwrap().unwrap();
    assert_eq!(refetched, updated);

    assert!(service.delete(&created.id).await.unwrap());
    assert_eq!(service.get(&created.id).await.unwrap(), None);
    assert!(!service.delete(&created.id).await.unwrap());
}

#[tokio::test]
async fn test_update_with_numbered_steps() {
    let (service, _store) = setup();
    let created = service.create(tarte()).await.unwrap();

    let update = RecipeUpdate {
        steps: Some(vec![
            StepInput::Ordered {
                order: 2,
                description: "Enfourner".to_string(),
            },
            StepInput::Ordered {
                order: 1,
                description: "Préchauffer le four".to_string(),
            },
        ]),
        ..Default::default()
    };
    let updated = service.update(&created.id, update).await.unwrap().unwrap();
    assert_eq!(updated.steps, vec!["Préchauffer le four", "Enfourner"]);
    assert_eq!(updated.total_time_minutes, 60);

    let gap = RecipeUpdate {
        steps: Some(vec![StepInput::Ordered {
            order: 2,
            description: "Enfourner".to_string(),
        }]),
        ..Default::default()
    };
    assert!(matches!(
        service.update(&created.id, gap).await,
        Err(RecipeError::InvalidInput(_))
    ));
    let unchanged = service.get(&created.id).await.unwrap().unwrap();
    assert_eq!(unchanged, updated);
}

#[tokio::test]
async fn test_hand_written_row_is_readable() {
    let (service, store) = setup();

    let row = Row::new(RECIPE_PARTITION_KEY, "legacy-42")
        .with(columns::TITLE, Property::Text("Gratin".to_string()))
        .with(columns::DIFFICULTY, Property::Text("facile".to_string()))
        .with(columns::MEAL_TYPE, Property::Text("not json".to_string()))
        .with(
            columns::STEPS,
            Property::Text(r#"[{"order": 1, "description": "Gratiner"}]"#.to_string()),
        )
        .with(columns::PREP_TIME_MINUTES, Property::Text("15".to_string()))
        .with(columns::COOK_TIME_MINUTES, Property::Int(0))
        .with(columns::TOTAL_TIME_MINUTES, Property::Int(15));
    store.put(row).await.unwrap();

    let recipe = service.get("legacy-42").await.unwrap().unwrap();
    assert_eq!(recipe.title, "Gratin");
    assert_eq!(recipe.difficulty, Difficulty::Easy);
    assert_eq!(recipe.meal_type, vec![MealType::MainCourse]);
    assert_eq!(recipe.steps, vec!["Gratiner"]);
    assert_eq!(recipe.prep_time_minutes, Some(15));
    assert_eq!(recipe.cook_time_minutes, None);
    assert_eq!(recipe.total_time_minutes, 15);

    let page = service.list(0, 10, None).await.unwrap();
    assert_eq!(page.total, 1);

    // Rewriting the recipe normalizes the row.
    let update = RecipeUpdate {
        servings: Some(2),
        ..Default::default()
    };
    service.update("legacy-42", update).await.unwrap().unwrap();
    let stored = store.get(RECIPE_PARTITION_KEY, "legacy-42").await.unwrap();
    assert_eq!(
        stored.get(columns::MEAL_TYPE),
        Some(&Property::Text(r#"["Plat principal"]"#.to_string()))
    );
    assert_eq!(stored.get(columns::PREP_TIME_MINUTES), Some(&Property::Int(15)));
}

#[tokio::test]
async fn test_list_filters_and_pagination() {
    let (service, _store) = setup();

    for i in 0..4 {
        let mut request = tarte();
        request.title = format!("Tarte n°{}", i);
        request.prep_time_minutes = Some(10 * (i + 1));
        service.create(request).await.unwrap();
    }
    let mut plat = tarte();
    plat.title = "Blanquette".to_string();
    plat.difficulty = Difficulty::Hard;
    plat.meal_type = vec![MealType::MainCourse];
    plat.tags = Some(vec!["Hiver".to_string()]);
    plat.ingredients = vec![Ingredient {
        name: "Veau".to_string(),
        quantity: 1.2,
        unit: Unit::Kilogram,
    }];
    service.create(plat).await.unwrap();

    let all = service.list(0, 100, None).await.unwrap();
    assert_eq!(all.total, 5);

    let first_two = service.list(0, 2, None).await.unwrap();
    let next_two = service.list(2, 2, None).await.unwrap();
    assert_eq!(first_two.recipes.len(), 2);
    assert_eq!(next_two.recipes.len(), 2);
    assert_eq!(first_two.recipes[..], all.recipes[0..2]);
    assert_eq!(next_two.recipes[..], all.recipes[2..4]);

    let quick_desserts = RecipeSearchFilters {
        meal_type: Some(MealType::Dessert),
        max_prep_time: Some(20),
        ..Default::default()
    };
    let page = service.list(0, 10, Some(&quick_desserts)).await.unwrap();
    assert_eq!(page.total, 2);

    let winter = RecipeSearchFilters {
        tags: Some(vec!["hiver".to_string()]),
        difficulty: Some(Difficulty::Hard),
        ..Default::default()
    };
    let page = service.list(0, 10, Some(&winter)).await.unwrap();
    assert_eq!(page.total, 1);
    assert_eq!(page.recipes[0].title, "Blanquette");

    let veal = service.search_by_ingredient("veau").await.unwrap();
    assert_eq!(veal.len(), 1);
}

#[tokio::test]
async fn test_unavailable_store() {
    let (service, store) = setup();
    let created = service.create(tarte()).await.unwrap();

    store.set_unavailable(true);
    assert!(matches!(
        service.get(&created.id).await,
        Err(RecipeError::StoreUnavailable(_))
    ));
    assert!(matches!(
        service.list(0, 10, None).await,
        Err(RecipeError::StoreUnavailable(_))
    ));
    assert!(matches!(
        service.delete(&created.id).await,
        Err(RecipeError::StoreUnavailable(_))
    ));

    store.set_unavailable(false);
    assert!(service.get(&created.id).await.unwrap().is_some());
}
