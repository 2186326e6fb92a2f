//! End-to-end generation over the recipes fixture

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use clientgen_core::emit::DISCLAIMER;
use clientgen_core::{generate, Config, Result};
use tempfile::TempDir;

const FIXTURE: &str = concat!(
    env!("CARGO_MANIFEST_DIR"),
    "/tests/fixtures/recipes.openapi.yaml"
);

const OPERATIONS: [&str; 10] = [
    "ArchiveRecipe",
    "CloneRecipe",
    "CreateRecipe",
    "GetMeals",
    "GetMermaidDiagramForRecipe",
    "GetRecipe",
    "GetRecipes",
    "SearchForRecipes",
    "UpdateRecipe",
    "loginForToken",
];

fn config_for(root: &Path) -> Config {
    let mut config = Config::new(FIXTURE);
    config.targets.backend = true;
    config.targets.frontend = true;
    config.output.backend_dir = root.join("golang");
    config.output.frontend_client_dir = root.join("ts/client");
    config.output.frontend_models_dir = root.join("ts/models");
    config.output.frontend_mocks_dir = root.join("ts/mocks");
    config
}

/// Every file under `root`, keyed by its path relative to `root`
fn snapshot(root: &Path) -> Result<BTreeMap<PathBuf, String>> {
    let mut files = BTreeMap::new();
    let mut pending = vec![root.to_path_buf()];
    while let Some(dir) = pending.pop() {
        for entry in fs::read_dir(&dir)? {
            let path = entry?.path();
            if path.is_dir() {
                pending.push(path);
            } else {
                let relative = path.strip_prefix(root).unwrap().to_path_buf();
                files.insert(relative, fs::read_to_string(&path)?);
            }
        }
    }
    Ok(files)
}

async fn generated() -> Result<(TempDir, BTreeMap<PathBuf, String>)> {
    let dir = tempfile::tempdir()?;
    generate(&config_for(dir.path())).await?;
    let files = snapshot(dir.path())?;
    Ok((dir, files))
}

fn file<'a>(files: &'a BTreeMap<PathBuf, String>, path: &str) -> &'a str {
    files
        .get(Path::new(path))
        .unwrap_or_else(|| panic!("{} was not generated", path))
}

#[tokio::test]
async fn test_report_counts() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let report = generate(&config_for(dir.path())).await?;

    let backend = report.backend.expect("backend pass ran");
    assert_eq!(backend.operations_rendered, OPERATIONS.len());
    assert_eq!(backend.schemas_lowered, 7);
    assert_eq!(backend.skipped_schemas, vec!["APIResponse", "ValidRecipeStatus"]);
    // operations, tests, types, static files
    assert_eq!(backend.files_written, 10 + 10 + 7 + 8);

    let frontend = report.frontend.expect("frontend pass ran");
    // models, static files, models index, client and bootstrap, tests, mocks
    assert_eq!(frontend.files_written, 7 + 5 + 1 + 2 + 10 + 10);
    assert!(frontend.unused_overrides.contains(&"MealPlan.status".to_string()));
    Ok(())
}

#[tokio::test]
async fn test_output_is_deterministic() -> Result<()> {
    let (dir, first) = generated().await?;
    generate(&config_for(dir.path())).await?;
    let second = snapshot(dir.path())?;
    assert_eq!(first, second);

    let (_other, elsewhere) = generated().await?;
    assert_eq!(first, elsewhere);
    Ok(())
}

#[tokio::test]
async fn test_every_file_carries_the_disclaimer() -> Result<()> {
    let (_dir, files) = generated().await?;
    for (path, contents) in &files {
        assert!(
            contents.starts_with(&format!("{}\n", DISCLAIMER)),
            "{} lacks the disclaimer",
            path.display()
        );
    }
    Ok(())
}

#[tokio::test]
async fn test_one_file_set_per_operation() -> Result<()> {
    let (_dir, files) = generated().await?;
    for id in OPERATIONS {
        file(&files, &format!("golang/op.{}.gen.go", id));
        file(&files, &format!("golang/op.{}.gen_test.go", id));
        file(&files, &format!("ts/client/op.{}.gen_test.ts", id));
        file(&files, &format!("ts/mocks/op.{}.gen.mock.ts", id));
    }

    assert!(files
        .iter()
        .all(|(path, contents)| !path.to_string_lossy().contains("CheckForLiveness")
            && !contents.contains("CheckForLiveness")));
    Ok(())
}

#[tokio::test]
async fn test_type_names_are_prefix_free_and_complete() -> Result<()> {
    let (_dir, files) = generated().await?;
    assert!(files
        .values()
        .all(|contents| !contents.contains("#/components/schemas/")));

    let go = file(&files, "golang/type.Recipe.gen.go");
    let body = go.split("type Recipe struct {\n").nth(1).unwrap();
    let fields: Vec<&str> = body.lines().take_while(|l| *l != "}").collect();
    assert_eq!(fields.len(), 7);
    assert!(fields.iter().any(|f| f.contains("*Uint16RangeWithOptionalMax")));
    assert!(fields.iter().any(|f| f.starts_with("\tStatus ") && f.contains(" string ")));

    let ts = file(&files, "ts/models/type.Recipe.gen.ts");
    let body = ts.split("export interface IRecipe {\n").nth(1).unwrap();
    let fields: Vec<&str> = body.lines().take_while(|l| *l != "}").collect();
    assert_eq!(fields.len(), 7);
    assert!(ts.contains("  yieldsPortions: NumberRangeWithOptionalMax;"));
    assert!(ts.contains("this.status = input.status ?? 'draft';"));
    assert!(ts.contains("import { ValidRecipeStatus } from './_unions';"));

    assert!(!files.contains_key(Path::new("golang/type.APIResponse.gen.go")));
    assert!(!files.contains_key(Path::new("ts/models/type.ValidRecipeStatus.gen.ts")));
    Ok(())
}

#[tokio::test]
async fn test_paths_and_query_filter() -> Result<()> {
    let (_dir, files) = generated().await?;

    let get = file(&files, "golang/op.GetRecipe.gen.go");
    assert!(get.contains("\trecipeID string,\n\treqMods ...RequestModifier,\n) (*Recipe, error) {"));
    assert!(get.contains("fmt.Sprintf(\"/api/v1/recipes/%s\", recipeID)"));

    let list = file(&files, "golang/op.GetRecipes.gen.go");
    assert!(list.contains("(*QueryFilteredResult[Recipe], error)"));
    assert!(list.contains("\tfilter *QueryFilter,\n"));
    let list_test = file(&files, "golang/op.GetRecipes.gen_test.go");
    assert!(list_test.contains("\"limit=50&page=1&sortBy=asc\""));

    // a partial filter set is dropped without making the op filtered
    let meals = file(&files, "golang/op.GetMeals.gen.go");
    assert!(!meals.contains("filter *QueryFilter"));
    assert!(!meals.contains("limit"));
    assert!(meals.contains("([]*Recipe, error)"));

    let search = file(&files, "golang/op.SearchForRecipes.gen.go");
    assert!(search.contains("\tq string,\n\tfilter *QueryFilter,\n"));
    assert!(search.contains("values.Set(textsearch.QueryKeySearch, q)"));
    assert!(search.contains("c.BuildURL(ctx, values, \"/api/v1/recipes/search\")"));
    assert!(!search.contains("%s"));

    let client = file(&files, "ts/client/client.gen.ts");
    assert!(client.contains("`/api/v1/recipes/${recipeID}`"));
    assert!(client.contains("async getRecipe(recipeID: string): Promise<Recipe> {"));
    assert!(client.contains("async searchForRecipes(q: string, filter: QueryFilter = QueryFilter.Default()): Promise<QueryFilteredResult<Recipe>> {"));
    Ok(())
}

#[tokio::test]
async fn test_request_bodies() -> Result<()> {
    let (_dir, files) = generated().await?;

    let create = file(&files, "golang/op.CreateRecipe.gen.go");
    assert!(create.contains("\tinput *RecipeCreationRequestInput,\n"));
    assert!(create.contains("c.buildDataRequest(ctx, http.MethodPost, u, input)"));

    let clone = file(&files, "golang/op.CloneRecipe.gen.go");
    assert!(!clone.contains("RecipeCreationRequestInput"));
    assert!(clone.contains("http.NewRequestWithContext(ctx, http.MethodPost, u, http.NoBody)"));

    let create_test = file(&files, "ts/client/op.CreateRecipe.gen_test.ts");
    assert!(create_test.contains("expect(mock.history.post[0].data).toBe(JSON.stringify(exampleInput));"));
    assert!(create_test.contains("mock.onPost(`/api/v1/recipes`).reply(201, exampleResponse);"));
    Ok(())
}

#[tokio::test]
async fn test_raw_login_response() -> Result<()> {
    let (_dir, files) = generated().await?;

    let client = file(&files, "ts/client/client.gen.ts");
    assert!(client.contains("Promise<AxiosResponse<APIResponse<TokenResponse>>>"));
    assert!(client.contains("res.data.error.message.toLowerCase() !== 'totp required'"));

    let test = file(&files, "ts/client/op.loginForToken.gen_test.ts");
    assert!(test.contains("should hand back a totp required response"));

    let go = file(&files, "golang/op.loginForToken.gen.go");
    assert!(go.contains("apiResponse.Error.Message != totpRequiredMessage"));
    Ok(())
}

#[tokio::test]
async fn test_mermaid_response_has_no_envelope() -> Result<()> {
    let (_dir, files) = generated().await?;

    let go = file(&files, "golang/op.GetMermaidDiagramForRecipe.gen.go");
    assert!(go.contains(") (string, error) {"));
    assert!(go.contains("\tvar apiResponse string\n"));
    assert!(!go.contains("APIResponse["));
    assert!(!go.contains(".Error.AsError()"));
    assert!(go.contains("\treturn apiResponse, nil\n}"));

    let go_test = file(&files, "golang/op.GetMermaidDiagramForRecipe.gen_test.go");
    assert!(go_test.contains("\t\texpected := data\n"));
    assert!(go_test.contains("T.Run(\"with invalid recipe ID\""));

    let client = file(&files, "ts/client/client.gen.ts");
    assert!(client.contains("async getMermaidDiagramForRecipe(recipeID: string): Promise<string> {"));
    Ok(())
}

#[tokio::test]
async fn test_go_test_matrix() -> Result<()> {
    let (_dir, files) = generated().await?;

    for id in OPERATIONS.iter().filter(|id| **id != "ArchiveRecipe") {
        let test = file(&files, &format!("golang/op.{}.gen_test.go", id));
        assert!(test.contains(&format!("func TestClient_{}(T *testing.T) {{", id)));
        for case in [
            "T.Run(\"standard\"",
            "T.Run(\"with error building request\"",
            "T.Run(\"with error executing request\"",
        ] {
            assert!(test.contains(case), "{} is missing {}", id, case);
        }
    }

    for id in ["CloneRecipe", "GetRecipe", "UpdateRecipe"] {
        let test = file(&files, &format!("golang/op.{}.gen_test.go", id));
        assert!(test.contains("T.Run(\"with invalid recipe ID\""), "{}", id);
    }

    let archive = file(&files, "golang/op.ArchiveRecipe.gen_test.go");
    assert!(archive.contains("func TestClient_ArchiveRecipe(T *testing.T) {"));
    assert!(file(&files, "golang/core.test_helpers.gen_test.go").contains("package apiclient"));
    Ok(())
}

#[tokio::test]
async fn test_frontend_bundle() -> Result<()> {
    let (_dir, files) = generated().await?;

    let models_index = file(&files, "ts/models/index.ts");
    assert!(models_index.contains("export * from './core.api_response.gen';"));
    assert!(models_index.contains("export * from './type.Recipe.gen';"));

    let index = file(&files, "ts/client/index.ts");
    for factory in [
        "buildServerSideClientWithOAuth2Token",
        "buildCookielessServerSideClient",
        "buildBrowserSideClient",
        "buildLocalClient",
    ] {
        assert!(index.contains(factory), "missing {}", factory);
    }

    let mock = file(&files, "ts/mocks/op.GetRecipes.gen.mock.ts");
    assert!(mock.contains("export class MockGetRecipesResponseConfig extends ResponseConfig<QueryFilteredResult<Recipe>> {"));
    assert!(mock.contains("export const mockGetRecipes = (resCfg: MockGetRecipesResponseConfig) => {"));
    file(&files, "ts/mocks/core.response_config.gen.ts");
    file(&files, "ts/client/core.test_helpers.gen.ts");
    Ok(())
}

#[tokio::test]
async fn test_stale_files_are_replaced() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let backend = dir.path().join("golang");
    fs::create_dir_all(&backend)?;
    fs::write(backend.join("op.RemovedOp.gen.go"), "stale")?;
    fs::write(backend.join("go.mod"), "module example")?;

    generate(&config_for(dir.path())).await?;

    assert!(!backend.join("op.RemovedOp.gen.go").exists());
    assert_eq!(fs::read_to_string(backend.join("go.mod"))?, "module example");
    Ok(())
}

#[tokio::test]
async fn test_without_tests() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let mut config = config_for(dir.path());
    config.include_tests = false;
    config.targets.frontend = false;

    let report = generate(&config).await?;
    assert_eq!(report.backend.map(|p| p.files_written), Some(10 + 7 + 7));
    assert!(report.frontend.is_none());

    let files = snapshot(dir.path())?;
    assert!(files
        .keys()
        .all(|path| !path.to_string_lossy().contains("_test")));
    Ok(())
}
