//! Operation compilation: one [`Operation`] per documented path and method

use tracing::{debug, warn};

use crate::resolver::SchemaResolver;
use crate::table::OperationTable;
use crate::types::*;

/// Media type whose schema becomes the operation's request body
const JSON_MEDIA_TYPE: &str = "application/json";

/// Compiles a loaded document into an [`OperationTable`]
pub struct OperationCompiler;

impl OperationCompiler {
    /// Compile every path x method pair of the document
    pub fn compile(document: &Document) -> OperationTable {
        let resolver = SchemaResolver::new(&document.components.schemas);
        let mut table = OperationTable::new();

        for (path, path_item) in &document.paths {
            for (key, value) in &path_item.entries {
                let Some(method) = HttpMethod::from_key(key) else {
                    continue;
                };

                let raw = match serde_json::from_value::<RawOperation>(value.clone()) {
                    Ok(raw) => raw,
                    Err(e) => {
                        warn!("Skipping malformed operation {} {}: {}", method, path, e);
                        continue;
                    }
                };

                let operation_id = match raw.operation_id.as_deref() {
                    Some(id) if !id.is_empty() => id.to_string(),
                    _ => {
                        let fallback = Self::fallback_operation_id(path, method);
                        warn!(
                            "{} {} has no operationId, registering it as {}",
                            method, path, fallback
                        );
                        fallback
                    }
                };

                let operation =
                    Self::compile_operation(path, method, &raw, &path_item.parameters, &resolver);

                if table.insert(operation_id.clone(), operation).is_some() {
                    warn!(
                        "Duplicate operationId {}, keeping the definition at {} {}",
                        operation_id, method, path
                    );
                }
            }
        }

        debug!("Compiled {} operations", table.len());
        table
    }

    fn compile_operation(
        path: &str,
        method: HttpMethod,
        raw: &RawOperation,
        path_parameters: &[RawParameter],
        resolver: &SchemaResolver,
    ) -> Operation {
        // Method-level parameters extend the path-level ones
        let parameters: Vec<&RawParameter> =
            path_parameters.iter().chain(raw.parameters.iter()).collect();

        let request_body = raw
            .request_body
            .as_ref()
            .and_then(|body| Self::json_body(body, resolver));

        let mut operation = Operation {
            name: raw.summary.clone(),
            path: path.to_string(),
            method,
            description: raw.description.clone(),
            request_body,
            path_parameter: None,
            query_parameter: None,
        };

        if !parameters.is_empty() {
            let classified = Self::classify_parameters(&parameters);
            operation.path_parameter = Some(classified.path_parameter);
            operation.query_parameter = Some(classified.query_parameter);
        }

        operation
    }

    /// Body of the `application/json` media type, if the operation has one
    fn json_body(body: &RawRequestBody, resolver: &SchemaResolver) -> Option<Body> {
        let media = body.content.get(JSON_MEDIA_TYPE)?;

        Some(match &media.schema {
            Some(schema) => resolver.resolve_request_body(schema),
            None => Body::default(),
        })
    }

    /// Split parameters into path and query buckets; other locations are dropped
    pub fn classify_parameters(parameters: &[&RawParameter]) -> RequestParameters {
        let mut result = RequestParameters::default();

        for parameter in parameters {
            let converted = Parameter {
                name: parameter.name.clone(),
                description: parameter.description.clone().unwrap_or_default(),
                required: parameter.required,
                schema: parameter.schema.clone(),
                example: parameter.example.clone(),
            };

            match parameter.location.as_str() {
                "query" => result.query_parameter.push(converted),
                "path" => result.path_parameter.push(converted),
                other => debug!("Dropping {} parameter {}", other, parameter.name),
            }
        }

        result
    }

    /// Key for operations without an operationId: /customer/{code} -> get_customer_code
    fn fallback_operation_id(path: &str, method: HttpMethod) -> String {
        let path_part = path
            .trim_start_matches('/')
            .replace('/', "_")
            .replace(['{', '}'], "");

        format!("{}_{}", method.as_str().to_lowercase(), path_part)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::DocumentLoader;

    const SAMPLE_SPEC: &str = r#"
openapi: 3.0.1
info:
  title: Paystack
  version: 1.0.0
paths:
  /transaction/partial_debit:
    post:
      operationId: transaction_partialDebit
      summary: Partial Debit
      description: Retrieve part of a payment from a customer
      requestBody:
        content:
          application/json:
            schema:
              $ref: '#/components/schemas/PartialDebit'
      responses:
        '200':
          description: OK
  /transaction:
    summary: Transactions
    get:
      operationId: transaction_list
      summary: List Transactions
      parameters:
        - name: perPage
          in: query
          schema:
            type: integer
        - name: X-Request-Id
          in: header
          schema:
            type: string
      responses:
        '200':
          description: OK
  /customer/{code}:
    parameters:
      - name: code
        in: path
        required: true
        description: Customer code
        schema:
          type: string
    get:
      operationId: customer_fetch
      summary: Fetch Customer
      responses:
        '200':
          description: OK
    put:
      operationId: customer_update
      summary: Update Customer
      parameters:
        - name: notify
          in: query
          schema:
            type: boolean
      requestBody:
        content:
          application/x-www-form-urlencoded:
            schema:
              $ref: '#/components/schemas/PartialDebit'
      responses:
        '200':
          description: OK
  /bank:
    get:
      summary: List Banks
      responses:
        '200':
          description: OK
components:
  schemas:
    PartialDebit:
      type: object
      required:
        - authorization_code
      properties:
        authorization_code:
          type: string
        currency:
          type: string
"#;

    fn compile() -> OperationTable {
        let document = DocumentLoader::load_str(SAMPLE_SPEC).unwrap();
        OperationCompiler::compile(&document)
    }

    #[test]
    fn test_compile_one_entry_per_path_and_method() {
        let table = compile();
        let ids: Vec<_> = table.ids().collect();
        assert_eq!(
            ids,
            vec![
                "transaction_partialDebit",
                "transaction_list",
                "customer_fetch",
                "customer_update",
                "get_bank"
            ]
        );
    }

    #[test]
    fn test_compile_operation_fields() {
        let table = compile();
        let op = table.get("transaction_partialDebit").unwrap();

        assert_eq!(op.name.as_deref(), Some("Partial Debit"));
        assert_eq!(op.path, "/transaction/partial_debit");
        assert_eq!(op.method, HttpMethod::Post);
        assert_eq!(
            op.description.as_deref(),
            Some("Retrieve part of a payment from a customer")
        );

        let body = op.request_body.as_ref().unwrap();
        assert_eq!(body.properties.len(), 2);
        assert!(body.properties[0].required);
        assert!(op.path_parameter.is_none());
        assert!(op.query_parameter.is_none());
    }

    #[test]
    fn test_path_level_parameters_come_before_method_parameters() {
        let document = DocumentLoader::load_str(
            r#"
openapi: 3.0.1
info: {title: Paystack, version: 1.0.0}
paths:
  /customer:
    parameters:
      - name: perPage
        in: query
        schema: {type: integer}
    get:
      operationId: customer_list
      parameters:
        - name: page
          in: query
          schema: {type: integer}
        - name: from
          in: query
          schema: {type: string, format: date-time}
"#,
        )
        .unwrap();

        let table = OperationCompiler::compile(&document);
        let query = table
            .get("customer_list")
            .unwrap()
            .query_parameter
            .as_ref()
            .unwrap();

        let names: Vec<_> = query.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["perPage", "page", "from"]);
    }

    #[test]
    fn test_header_parameters_are_dropped() {
        let table = compile();
        let op = table.get("transaction_list").unwrap();

        let query = op.query_parameter.as_ref().unwrap();
        assert_eq!(query.len(), 1);
        assert_eq!(query[0].name, "perPage");
        assert!(!query[0].required);
        assert_eq!(query[0].description, "");
        assert!(op.path_parameter.as_ref().unwrap().is_empty());
    }

    #[test]
    fn test_path_parameters_are_a_per_method_baseline() {
        let table = compile();

        let fetch = table.get("customer_fetch").unwrap();
        assert_eq!(fetch.path_parameter.as_ref().unwrap().len(), 1);
        assert!(fetch.query_parameter.as_ref().unwrap().is_empty());

        let update = table.get("customer_update").unwrap();
        let path_params = update.path_parameter.as_ref().unwrap();
        assert_eq!(path_params.len(), 1);
        assert_eq!(path_params[0].name, "code");
        assert!(path_params[0].required);
        assert_eq!(update.query_parameter.as_ref().unwrap()[0].name, "notify");
    }

    #[test]
    fn test_non_json_body_yields_no_request_body() {
        let table = compile();
        assert!(table.get("customer_update").unwrap().request_body.is_none());
    }

    #[test]
    fn test_missing_operation_id_gets_fallback_key() {
        let table = compile();
        let op = table.get("get_bank").unwrap();
        assert_eq!(op.name.as_deref(), Some("List Banks"));
    }

    #[test]
    fn test_json_body_without_schema_is_empty() {
        let yaml = r#"
openapi: 3.0.0
paths:
  /refund:
    post:
      operationId: refund_create
      requestBody:
        content:
          application/json: {}
"#;
        let document = DocumentLoader::load_str(yaml).unwrap();
        let table = OperationCompiler::compile(&document);
        let body = table.get("refund_create").unwrap().request_body.as_ref().unwrap();
        assert!(body.is_empty());
    }

    #[test]
    fn test_duplicate_operation_id_keeps_last() {
        let yaml = r#"
openapi: 3.0.0
paths:
  /plan:
    get:
      operationId: plan
      summary: First
    post:
      operationId: plan
      summary: Second
"#;
        let document = DocumentLoader::load_str(yaml).unwrap();
        let table = OperationCompiler::compile(&document);
        assert_eq!(table.len(), 1);
        assert_eq!(table.get("plan").unwrap().name.as_deref(), Some("Second"));
    }

    #[test]
    fn test_compile_is_deterministic() {
        assert_eq!(compile(), compile());
    }

    #[test]
    fn test_fallback_operation_id() {
        assert_eq!(
            OperationCompiler::fallback_operation_id("/customer/{code}/identification", HttpMethod::Post),
            "post_customer_code_identification"
        );
    }
}
