#[cfg(test)]
mod tests {
    use crate::{
        impl_named, impl_record, params,
        sql::{rebind, rewrite_placeholders, Dialect, SqlError},
        value::SqlValue,
    };

    #[derive(Debug, Default)]
    struct OrderId(i64);
    impl_named!(OrderId(i64));

    #[derive(Debug, Default)]
    struct Tenant {
        tenant: String,
    }
    impl_record!(Tenant { tenant: String });

    #[derive(Debug, Default)]
    struct Search {
        status: String,
        ids: Vec<i64>,
        limit: Option<u32>,
        tenant: Option<Tenant>,
    }
    impl_record!(Search {
        status: String,
        ids: Vec<i64>,
        limit: Option<u32> = "max_rows",
        tenant: Option<Tenant> [embedded],
    });

    #[test]
    fn repeated_names_and_sequences_in_dollar_dialect() {
        let arr = vec![1i64];
        let p = params! { "x" => 9i64, "arr" => arr };
        let bound = rebind("WHERE a=:x OR b=:x OR c IN (:arr) OR d=:x", Dialect::Dollar, &[&p]).unwrap();

        assert_eq!(bound.query, "WHERE a=$1 OR b=$2 OR c IN ($3) OR d=$4");
        assert_eq!(
            bound.values().unwrap(),
            vec![SqlValue::Int(9), SqlValue::Int(9), SqlValue::Int(1), SqlValue::Int(9)]
        );
    }

    #[test]
    fn sequences_of_any_element_type_expand() {
        let names = vec!["ann", "bo"];
        let maybe = vec![Some(1i64), None];
        let orders = vec![OrderId(5), OrderId(6)];
        let all = [10u32, 11, 12];
        let window: &[u32] = &all[1..];
        let p = params! { "names" => names, "maybe" => maybe, "orders" => orders, "window" => window };

        let bound = rebind(
            "name IN (:names) AND v IN (:maybe) AND o IN (:orders) AND w IN (:window)",
            Dialect::Dollar,
            &[&p],
        )
        .unwrap();
        assert_eq!(bound.query, "name IN ($1,$2) AND v IN ($3,$4) AND o IN ($5,$6) AND w IN ($7,$8)");
        assert_eq!(
            bound.values().unwrap(),
            vec![
                SqlValue::Text("ann".into()),
                SqlValue::Text("bo".into()),
                SqlValue::Int(1),
                SqlValue::Null,
                SqlValue::Int(5),
                SqlValue::Int(6),
                SqlValue::Uint(11),
                SqlValue::Uint(12),
            ]
        );
    }

    #[test]
    fn record_parameters_with_embedded_pointer() {
        let search = Search {
            status: "active".into(),
            ids: vec![1, 2, 3],
            limit: Some(50),
            tenant: Some(Tenant { tenant: "acme".into() }),
        };
        let bound = rebind(
            "SELECT * FROM users WHERE status=:status AND id IN (:ids) AND tenant=:Tenant LIMIT :max_rows",
            Dialect::Dollar,
            &[&search],
        )
        .unwrap();

        assert_eq!(
            bound.query,
            "SELECT * FROM users WHERE status=$1 AND id IN ($2,$3,$4) AND tenant=$5 LIMIT $6"
        );
        assert_eq!(
            bound.values().unwrap(),
            vec![
                SqlValue::Text("active".into()),
                SqlValue::Int(1),
                SqlValue::Int(2),
                SqlValue::Int(3),
                SqlValue::Text("acme".into()),
                SqlValue::Uint(50),
            ]
        );
    }

    #[test]
    fn nil_embedded_pointer_hides_its_keys() {
        let search = Search { status: "x".into(), ..Search::default() };
        let err = rebind("status=:status AND tenant=:tenant", Dialect::Question, &[&search]).unwrap_err();
        assert_eq!(err, SqlError::MissingValue("tenant".into()));

        let bound = rebind("status=:status AND ids IN (:ids) AND lim=:max_rows", Dialect::Question, &[&search]).unwrap();
        assert_eq!(bound.query, "status=? AND ids IN (NULL) AND lim=?");
        assert_eq!(bound.values().unwrap(), vec![SqlValue::Text("x".into()), SqlValue::Null]);
    }

    #[test]
    fn empty_pointer_to_record_is_nil_parameters() {
        let missing: Option<Search> = None;
        let err = rebind("status=:status", Dialect::Dollar, &[&missing]).unwrap_err();
        assert_eq!(err, SqlError::NilParameters);
    }

    #[test]
    fn casts_literals_and_comments_survive_binding() {
        let p = params! { "id" => 4i64 };
        let query = "SELECT ':id', data::jsonb -- :id ?\nFROM t /* ? */ WHERE id = :id AND body = $$ :id ? $$";
        let bound = rebind(query, Dialect::AtP, &[&p]).unwrap();
        assert_eq!(
            bound.query,
            "SELECT ':id', data::jsonb -- :id ?\nFROM t /* ? */ WHERE id = @p1 AND body = $$ :id ? $$"
        );
        assert_eq!(bound.args.len(), 1);
    }

    #[test]
    fn failures_produce_nothing() {
        let p = params! { "a" => 1i64 };
        for query in ["a = :a AND b = 'open", "a = :a /* open", "a = :a AND b = \"open", "a = :a $x$ open"] {
            assert!(rebind(query, Dialect::Dollar, &[&p]).is_err(), "{query}");
            assert!(rebind(query, Dialect::Dollar, &[&1i64, &2i64]).is_err(), "{query}");
        }
    }

    #[test]
    fn rewriting_is_stable_and_gapless() {
        let query = "a=? AND b IN (?,?,?) AND c='?' AND d=?";
        let once = rewrite_placeholders(query, Dialect::Colon).unwrap();
        assert_eq!(once, "a=:1 AND b IN (:2,:3,:4) AND c='?' AND d=:5");
        assert_eq!(rewrite_placeholders(&once, Dialect::Colon).unwrap(), once);
    }

    #[test]
    fn mixed_case_names_resolve_once_stored() {
        let p = params! { "UserId" => 11i64 };
        let bound = rebind("a = :userid OR b = :USERID", Dialect::Question, &[&p]).unwrap();
        assert_eq!(bound.values().unwrap(), vec![SqlValue::Int(11), SqlValue::Int(11)]);
    }
}
