#[cfg(test)]
mod tests {
    use crate::Modeling::{
        ConstraintComponent, DataRef, Expr, ExpressionComponent, Index, Model, ModelError,
        ObjectiveComponent, ParamComponent, Relation, SuffixDirection, VarComponent,
    };
    use crate::Sensitivity::interface::rollback_setup;
    use crate::Sensitivity::pinning::pin_parameters;
    use crate::Sensitivity::planner::plan_substitutions;
    use crate::Sensitivity::rewriter::rewrite_expressions;
    use crate::Sensitivity::sens_block::SensitivityBlock;
    use crate::settings::SensitivityConfig;
    use crate::Sensitivity::pinning::{
        DCDP, DELTA_P, K_AUG_SUFFIXES, SENS_INIT_CONSTR, SENS_STATE_0, SENS_STATE_1,
        SENS_STATE_VALUE_1, SIPOPT_SUFFIXES,
    };
    use crate::Sensitivity::resolver::{ComponentUid, find_components, resolve_components};
    use crate::Sensitivity::{
        ComponentRef, PerturbValue, SensitivityError, SensitivityInterface, SubstitutionSource,
    };
    use approx::assert_relative_eq;

    /// x + p == 10, min (x - 3)^2
    fn scalar_param_model() -> Model {
        let mut m = Model::new("scalar");
        let root = m.root();
        let x = m.add_var(root, "x", VarComponent::scalar(Some(5.0))).unwrap();
        let p = m.add_param(root, "p", ParamComponent::scalar(5.0, true)).unwrap();
        m.add_constraint(
            root,
            "c",
            ConstraintComponent::scalar(Relation::eq(
                Expr::var(DataRef::scalar(x)) + Expr::param(DataRef::scalar(p)),
                Expr::Const(10.0),
            )),
        )
        .unwrap();
        m.add_objective(
            root,
            "obj",
            ObjectiveComponent::minimize((Expr::var(DataRef::scalar(x)) - 3.0).powf(2.0)),
        )
        .unwrap();
        m
    }

    /// x + y == 4 with y fixed at 2
    fn fixed_var_model() -> Model {
        let mut m = Model::new("fixed");
        let root = m.root();
        let x = m.add_var(root, "x", VarComponent::scalar(Some(2.0))).unwrap();
        let y = m
            .add_var(root, "y", VarComponent::scalar(Some(2.0)).fixed())
            .unwrap();
        m.add_constraint(
            root,
            "c",
            ConstraintComponent::scalar(Relation::eq(
                Expr::var(DataRef::scalar(x)) + Expr::var(DataRef::scalar(y)),
                Expr::Const(4.0),
            )),
        )
        .unwrap();
        m
    }

    fn id(m: &Model, path: &str) -> usize {
        m.find_component(path).unwrap()
    }

    #[test]
    fn test_scalar_parameter_end_to_end() {
        let m = scalar_param_model();
        let p = id(&m, "p");
        let c = id(&m, "c");
        let obj = id(&m, "obj");
        let mut sens = SensitivityInterface::new(m, true);
        sens.setup_sensitivity(&[ComponentRef::whole(p)]).unwrap();

        let sb = sens.sensitivity_block().unwrap().clone();
        let work = &sens.model_instance;
        assert_eq!(sb.records.len(), 1);
        let rec = &sb.records[0];
        assert_eq!(rec.source, SubstitutionSource::Parameter);
        assert_eq!(rec.parameter, DataRef::scalar(p));
        assert_eq!(rec.container_index, None);
        assert_eq!(
            work.path(rec.free.component).unwrap(),
            "_SENSITIVITY_TOOLBOX_DATA.p"
        );
        assert_relative_eq!(work.value(&rec.free).unwrap(), 5.0);
        assert!(!work.is_fixed(&rec.free).unwrap());

        // pinning: p_var - p == 0
        let pin = sb.pinning_constraint(0).unwrap();
        assert_eq!(
            work.constraint_data(&pin).unwrap().relation,
            Relation::Equality(
                Expr::Var(rec.free.clone()) - Expr::Param(rec.parameter.clone()),
                Expr::Const(0.0)
            )
        );

        // rewritten constraint x + p_var == 10, original deactivated
        assert!(!work.constraint_data(&DataRef::scalar(c)).unwrap().active);
        let const_list = sb.const_list.unwrap();
        let rows = work.component_items(const_list).unwrap();
        assert_eq!(rows.len(), 1);
        match &work.constraint_data(&rows[0]).unwrap().relation {
            Relation::Equality(lhs, rhs) => {
                let leaves = lhs.leaves(work).unwrap();
                assert!(leaves.contains(&rec.free));
                assert!(!leaves.contains(&rec.parameter));
                assert_eq!(*rhs, Expr::Const(10.0));
            }
            other => panic!("unexpected relation {:?}", other),
        }

        // objectives: the original is inactive, the shadow one lives on the block
        assert!(!work.objective(obj).unwrap().active);
        assert_eq!(sb.objectives.len(), 1);
        assert_eq!(
            work.active_objectives(),
            vec![DataRef::scalar(sb.objectives[0])]
        );
        assert!(sb.has_replaced_expressions);

        // annotation stamps
        assert_eq!(work.suffixes.get(SENS_STATE_0, &rec.free), Some(1.0));
        assert_eq!(work.suffixes.get(SENS_STATE_1, &rec.free), Some(1.0));
        assert_eq!(work.suffixes.get(SENS_INIT_CONSTR, &pin), Some(1.0));
        assert_eq!(work.suffixes.get(DCDP, &pin), Some(1.0));

        sens.perturb_parameters(&[PerturbValue::Scalar(7.0)]).unwrap();
        let work = &sens.model_instance;
        assert_eq!(work.suffixes.get(SENS_STATE_VALUE_1, &rec.free), Some(7.0));
        sens.pretty_print_records();
    }

    /// DeltaP is stored as current value minus perturbed value
    #[test]
    fn test_delta_p_sign_convention() {
        let m = scalar_param_model();
        let p = id(&m, "p");
        let mut sens = SensitivityInterface::new(m, false);
        sens.setup_sensitivity(&[ComponentRef::whole(p)]).unwrap();
        sens.perturb_parameters(&[PerturbValue::Scalar(7.0)]).unwrap();
        let sb = sens.sensitivity_block().unwrap();
        let pin = sb.pinning_constraint(0).unwrap();
        let delta = sens.model_instance.suffixes.get(DELTA_P, &pin).unwrap();
        assert_relative_eq!(delta, 5.0 - 7.0);
    }

    #[test]
    fn test_fixed_variable_designation() {
        let m = fixed_var_model();
        let y = id(&m, "y");
        let c = id(&m, "c");
        let mut sens = SensitivityInterface::new(m, true);
        sens.setup_sensitivity(&[ComponentRef::whole(y)]).unwrap();
        let sb = sens.sensitivity_block().unwrap().clone();
        let work = &sens.model_instance;

        assert_eq!(sb.records.len(), 1);
        let rec = &sb.records[0];
        assert_eq!(rec.source, SubstitutionSource::Variable);
        assert_eq!(rec.free, DataRef::scalar(y));
        assert!(!work.is_fixed(&DataRef::scalar(y)).unwrap());
        let param = work.param(rec.parameter.component).unwrap();
        assert!(param.mutable);
        assert_relative_eq!(work.param_value(&rec.parameter).unwrap(), 2.0);

        // y - y_param == 0
        let pin = sb.pinning_constraint(0).unwrap();
        assert_eq!(
            work.constraint_data(&pin).unwrap().relation,
            Relation::Equality(
                Expr::Var(DataRef::scalar(y)) - Expr::Param(rec.parameter.clone()),
                Expr::Const(0.0)
            )
        );
        // nothing rewritten
        assert!(!sb.has_replaced_expressions);
        assert!(sb.const_list.is_none());
        assert!(work.constraint_data(&DataRef::scalar(c)).unwrap().active);
        // the user's model keeps y fixed
        assert!(
            sens.original_model()
                .is_fixed(&DataRef::scalar(y))
                .unwrap()
        );
    }

    #[test]
    fn test_teardown_restores_fixed_state() {
        let m = fixed_var_model();
        let y = DataRef::scalar(id(&m, "y"));
        let mut sens = SensitivityInterface::new(m, false);
        sens.setup_sensitivity(&[ComponentRef::from(y.clone())]).unwrap();
        assert!(!sens.model_instance.is_fixed(&y).unwrap());
        sens.teardown().unwrap();
        assert!(sens.model_instance.is_fixed(&y).unwrap());
        assert_relative_eq!(sens.model_instance.value(&y).unwrap(), 2.0);
        assert!(sens.block_id().is_none());
    }

    #[test]
    fn test_rebuild_without_substitution() {
        let m = fixed_var_model();
        let y = id(&m, "y");
        let mut sens = SensitivityInterface::new(m, true);
        sens.setup_sensitivity(&[ComponentRef::whole(y)]).unwrap();
        sens.setup_sensitivity(&[ComponentRef::whole(y)]).unwrap();
        let sb = sens.sensitivity_block().unwrap();
        assert_eq!(sb.records.len(), 1);
        // rebuilt block names its parameter without collision suffix
        assert_eq!(
            sens.model_instance.local_name(sb.records[0].parameter.component).unwrap(),
            "y"
        );
        assert!(!sens.model_instance.is_fixed(&DataRef::scalar(y)).unwrap());
    }

    #[test]
    fn test_rebuild_after_substitution_refused() {
        let m = scalar_param_model();
        let p = id(&m, "p");
        let mut sens = SensitivityInterface::new(m, true);
        sens.setup_sensitivity(&[ComponentRef::whole(p)]).unwrap();
        let err = sens.setup_sensitivity(&[ComponentRef::whole(p)]).unwrap_err();
        assert!(matches!(err, SensitivityError::Configuration(_)));
    }

    #[test]
    fn test_unfixed_variable_rejected() {
        let m = scalar_param_model();
        let x = id(&m, "x");
        let mut sens = SensitivityInterface::new(m, true);
        let err = sens.setup_sensitivity(&[ComponentRef::whole(x)]).unwrap_err();
        assert!(matches!(err, SensitivityError::Configuration(msg) if msg.contains("must be fixed")));
        assert!(sens.block_id().is_none());
    }

    #[test]
    fn test_immutable_parameter_rejected() {
        let mut m = scalar_param_model();
        let root = m.root();
        let k = m.add_param(root, "k", ParamComponent::scalar(1.0, false)).unwrap();
        let p = id(&m, "p");
        let mut sens = SensitivityInterface::new(m, true);
        let err = sens
            .setup_sensitivity(&[ComponentRef::whole(p), ComponentRef::whole(k)])
            .unwrap_err();
        assert!(matches!(err, SensitivityError::Configuration(msg) if msg.contains("mutable")));
        // nothing left behind, a corrected call succeeds
        assert!(sens.block_id().is_none());
        sens.setup_sensitivity(&[ComponentRef::whole(p)]).unwrap();
    }

    #[test]
    fn test_invalid_configured_names_leave_model_untouched() {
        let m = fixed_var_model();
        let y = DataRef::scalar(id(&m, "y"));
        let config = SensitivityConfig {
            param_const_name: "param-const".to_string(),
            clone_model: false,
            ..SensitivityConfig::default()
        };
        let mut sens = SensitivityInterface::from_config(m, &config);
        let err = sens.setup_sensitivity(&[ComponentRef::from(y.clone())]).unwrap_err();
        assert!(matches!(err, SensitivityError::Model(ModelError::InvalidName(_))));
        assert!(sens.model_instance.is_fixed(&y).unwrap());
        assert!(sens.block_id().is_none());
        sens.teardown().unwrap();

        let m = scalar_param_model();
        let p = id(&m, "p");
        let c = DataRef::scalar(id(&m, "c"));
        let config = SensitivityConfig {
            const_list_name: "const list".to_string(),
            clone_model: false,
            ..SensitivityConfig::default()
        };
        let mut sens = SensitivityInterface::from_config(m, &config);
        assert!(sens.setup_sensitivity(&[ComponentRef::whole(p)]).is_err());
        assert!(sens.model_instance.constraint_data(&c).unwrap().active);
        assert_eq!(sens.model_instance.active_constraints().len(), 1);
        assert_eq!(sens.model_instance.active_objectives().len(), 1);
        assert!(sens.block_id().is_none());

        // the same interface recovers once the names are valid
        let mut sens = SensitivityInterface::new(sens.into_model(), false);
        sens.setup_sensitivity(&[ComponentRef::whole(p)]).unwrap();
        assert!(sens.sensitivity_block().unwrap().has_replaced_expressions);
    }

    #[test]
    fn test_rewrite_failure_rolled_back() {
        let mut m = scalar_param_model();
        let root = m.root();
        let x = DataRef::scalar(id(&m, "x"));
        let y = DataRef::scalar(
            m.add_var(root, "y", VarComponent::scalar(Some(1.0)).fixed())
                .unwrap(),
        );
        let e = m
            .add_expression(root, "e", ExpressionComponent::scalar(Expr::var(x.clone())))
            .unwrap();
        // refers to an element the named expression does not have
        m.add_constraint(
            root,
            "broken",
            ConstraintComponent::scalar(Relation::le(
                Expr::Named(DataRef::indexed(e, 9)),
                Expr::var(y.clone()),
            )),
        )
        .unwrap();
        let p = id(&m, "p");
        let obj = id(&m, "obj");

        let mut sens = SensitivityInterface::new(m, false);
        let err = sens
            .setup_sensitivity(&[ComponentRef::whole(p), ComponentRef::from(y.clone())])
            .unwrap_err();
        assert!(matches!(err, SensitivityError::Model(ModelError::UnknownIndex { .. })));
        let work = &sens.model_instance;
        assert!(work.objective(obj).unwrap().active);
        assert_eq!(work.active_constraints().len(), 2);
        assert!(work.is_fixed(&y).unwrap());
        assert!(sens.block_id().is_none());
        sens.teardown().unwrap();
    }

    #[test]
    fn test_pinning_failure_rolled_back() {
        let mut m = scalar_param_model();
        let p = id(&m, "p");
        let c = DataRef::scalar(id(&m, "c"));
        let root = m.root();
        let y = DataRef::scalar(
            m.add_var(root, "y", VarComponent::scalar(Some(1.0)).fixed())
                .unwrap(),
        );
        let block = m.add_block(root, "_SENSITIVITY_TOOLBOX_DATA").unwrap();
        let param_list = vec![ComponentRef::whole(p), ComponentRef::from(y.clone())];
        let mut sb = SensitivityBlock::new(block, param_list.clone());
        sb.records = plan_substitutions(&mut m, block, &param_list).unwrap();
        let mut deactivated = Vec::new();
        rewrite_expressions(&mut m, &mut sb, "constList", &mut deactivated).unwrap();
        assert_eq!(deactivated.len(), 2);
        assert!(m.active_constraints().iter().all(|r| r.component != c.component));

        let err = pin_parameters(&mut m, &mut sb, "param-const").unwrap_err();
        assert!(matches!(err, SensitivityError::Model(ModelError::InvalidName(_))));
        rollback_setup(&mut m, block, &sb.records, &deactivated).unwrap();
        assert!(m.constraint_data(&c).unwrap().active);
        assert_eq!(m.active_objectives().len(), 1);
        assert!(m.is_fixed(&y).unwrap());
        assert!(m.find_component("_SENSITIVITY_TOOLBOX_DATA").is_err());

        let mut sens = SensitivityInterface::new(m, false);
        sens.setup_sensitivity(&[ComponentRef::whole(p)]).unwrap();
    }

    #[test]
    fn test_other_component_kinds_rejected() {
        let m = scalar_param_model();
        let c = id(&m, "c");
        let mut sens = SensitivityInterface::new(m, true);
        let err = sens.setup_sensitivity(&[ComponentRef::whole(c)]).unwrap_err();
        assert!(matches!(err, SensitivityError::Configuration(_)));
    }

    #[test]
    fn test_indexed_parameter() {
        let mut m = Model::new("indexed");
        let root = m.root();
        let x = m
            .add_var(root, "x", VarComponent::indexed(vec![(1, 0.0), (2, 0.0), (3, 0.0)]))
            .unwrap();
        let p = m
            .add_param(
                root,
                "p",
                ParamComponent::indexed(vec![(3, 30.0), (1, 10.0), (2, 20.0)], true),
            )
            .unwrap();
        m.add_constraint(
            root,
            "c",
            ConstraintComponent::indexed((1..=3).map(|i| {
                (
                    i,
                    Relation::eq(
                        Expr::var(DataRef::indexed(x, i)),
                        Expr::param(DataRef::indexed(p, i)),
                    ),
                )
            })),
        )
        .unwrap();
        let mut sens = SensitivityInterface::new(m, true);
        sens.setup_sensitivity(&[ComponentRef::whole(p)]).unwrap();
        let sb = sens.sensitivity_block().unwrap().clone();
        let work = &sens.model_instance;

        assert_eq!(sb.records.len(), 3);
        for (k, rec) in sb.records.iter().enumerate() {
            let i = (k + 1) as i64;
            assert_eq!(rec.container_index, Some(Index::Int(i)));
            assert_eq!(rec.list_index, 0);
            assert_eq!(rec.parameter, DataRef::indexed(p, i));
            assert_relative_eq!(work.value(&rec.free).unwrap(), 10.0 * i as f64);
            assert_eq!(
                work.suffixes.get(SENS_STATE_0, &rec.free),
                Some((k + 1) as f64)
            );
        }
        assert!(work.var(sb.records[0].free.component).unwrap().data.is_indexed());
        assert_eq!(
            work.component_items(sb.const_list.unwrap()).unwrap().len(),
            3
        );

        let err = sens
            .perturb_parameters(&[PerturbValue::Indexed(vec![(Index::Int(1), 11.0)])])
            .unwrap_err();
        assert!(matches!(err, SensitivityError::Configuration(_)));
        // a rejected perturbation writes nothing, not even for the elements it covers
        for rec in &sb.records {
            assert_eq!(
                sens.model_instance.suffixes.get(SENS_STATE_VALUE_1, &rec.free),
                None
            );
        }
        for k in 0..sb.records.len() {
            let pin = sb.pinning_constraint(k).unwrap();
            assert_eq!(sens.model_instance.suffixes.get(DELTA_P, &pin), None);
        }

        sens.perturb_parameters(&[PerturbValue::Indexed(vec![
            (Index::Int(1), 11.0),
            (Index::Int(2), 22.0),
            (Index::Int(3), 33.0),
        ])])
        .unwrap();
        let work = &sens.model_instance;
        for (k, rec) in sb.records.iter().enumerate() {
            let target = 11.0 * (k + 1) as f64;
            assert_eq!(work.suffixes.get(SENS_STATE_VALUE_1, &rec.free), Some(target));
            let pin = sb.pinning_constraint(k).unwrap();
            assert_relative_eq!(
                work.suffixes.get(DELTA_P, &pin).unwrap(),
                10.0 * (k + 1) as f64 - target
            );
        }

        // a scalar entry applies to every element
        sens.perturb_parameters(&[PerturbValue::Scalar(1.0)]).unwrap();
        for rec in &sb.records {
            assert_eq!(
                sens.model_instance.suffixes.get(SENS_STATE_VALUE_1, &rec.free),
                Some(1.0)
            );
        }
    }

    #[test]
    fn test_single_element_designation() {
        let mut m = Model::new("element");
        let root = m.root();
        let x = m.add_var(root, "x", VarComponent::scalar(Some(0.0))).unwrap();
        let p = m
            .add_param(root, "p", ParamComponent::indexed(vec![(1, 1.0), (2, 2.0)], true))
            .unwrap();
        m.add_constraint(
            root,
            "c",
            ConstraintComponent::scalar(Relation::eq(
                Expr::var(DataRef::scalar(x)),
                Expr::param(DataRef::indexed(p, 1)) + Expr::param(DataRef::indexed(p, 2)),
            )),
        )
        .unwrap();
        let mut sens = SensitivityInterface::new(m, true);
        sens.setup_sensitivity(&[ComponentRef::element(p, 2)]).unwrap();
        let sb = sens.sensitivity_block().unwrap().clone();
        let work = &sens.model_instance;
        assert_eq!(sb.records.len(), 1);
        let rec = &sb.records[0];
        assert_eq!(rec.container_index, None);
        assert_eq!(rec.parameter, DataRef::indexed(p, 2));
        assert_eq!(work.local_name(rec.free.component).unwrap(), "p_2");
        assert!(!work.is_indexed(rec.free.component).unwrap());
        let row = &work.component_items(sb.const_list.unwrap()).unwrap()[0];
        let leaves = match &work.constraint_data(row).unwrap().relation {
            Relation::Equality(_, rhs) => rhs.leaves(work).unwrap(),
            other => panic!("unexpected relation {:?}", other),
        };
        assert!(leaves.contains(&DataRef::indexed(p, 1)));
        assert!(!leaves.contains(&DataRef::indexed(p, 2)));
        assert!(leaves.contains(&rec.free));
    }

    #[test]
    fn test_element_substitute_keeps_underscores() {
        let mut m = Model::new("streams");
        let root = m.root();
        let p = m
            .add_param(
                root,
                "p",
                ParamComponent::indexed(vec![("a_b", 1.0), ("ab", 2.0)], true),
            )
            .unwrap();
        let mut sens = SensitivityInterface::new(m, false);
        sens.setup_sensitivity(&[ComponentRef::element(p, "a_b")]).unwrap();
        let rec = &sens.records()[0];
        assert_eq!(rec.parameter, DataRef::indexed(p, "a_b"));
        assert_eq!(sens.model_instance.local_name(rec.free.component).unwrap(), "p_a_b");
    }

    #[test]
    fn test_ranged_constraint_split() {
        let mut m = Model::new("ranged");
        let root = m.root();
        let x = DataRef::scalar(m.add_var(root, "x", VarComponent::scalar(Some(1.0))).unwrap());
        let p = m.add_param(root, "p", ParamComponent::scalar(2.0, true)).unwrap();
        let c = m
            .add_constraint(
                root,
                "c",
                ConstraintComponent::scalar(Relation::ranged(
                    Expr::Const(1.0),
                    Expr::var(x.clone()) * Expr::param(DataRef::scalar(p)),
                    Expr::Const(10.0),
                )),
            )
            .unwrap();
        let original = m
            .constraint_data(&DataRef::scalar(c))
            .unwrap()
            .relation
            .clone();
        let mut sens = SensitivityInterface::new(m, false);
        sens.setup_sensitivity(&[ComponentRef::whole(p)]).unwrap();
        let sb = sens.sensitivity_block().unwrap().clone();
        let rows: Vec<Relation> = sens
            .model_instance
            .component_items(sb.const_list.unwrap())
            .unwrap()
            .iter()
            .map(|r| {
                sens.model_instance
                    .constraint_data(r)
                    .unwrap()
                    .relation
                    .clone()
            })
            .collect();
        assert_eq!(rows.len(), 2);
        assert!(rows.iter().all(|r| matches!(r, Relation::Inequality(_, _))));

        for k in -10..=20 {
            let xv = k as f64 * 0.5;
            sens.model_instance.set_value(&x, xv).unwrap();
            let work = &sens.model_instance;
            let before = original.is_satisfied(work, 1e-12).unwrap();
            let after = rows
                .iter()
                .all(|r| r.is_satisfied(work, 1e-12).unwrap());
            assert_eq!(before, after, "x = {}", xv);
        }
    }

    #[test]
    fn test_named_expressions_inlined_and_nested_blocks() {
        let mut m = Model::new("nested");
        let root = m.root();
        let x = DataRef::scalar(m.add_var(root, "x", VarComponent::scalar(Some(1.0))).unwrap());
        let p = DataRef::scalar(m.add_param(root, "p", ParamComponent::scalar(4.0, true)).unwrap());
        let e = DataRef::scalar(
            m.add_expression(
                root,
                "e",
                ExpressionComponent::scalar(Expr::param(p.clone()) * Expr::var(x.clone())),
            )
            .unwrap(),
        );
        let unit = m.add_block(root, "unit").unwrap();
        let inner = m
            .add_constraint(
                unit,
                "inner",
                ConstraintComponent::scalar(Relation::le(Expr::named(e.clone()), Expr::Const(8.0))),
            )
            .unwrap();
        m.add_objective(unit, "cost", ObjectiveComponent::maximize(Expr::named(e)))
            .unwrap();
        let mut sens = SensitivityInterface::new(m, true);
        sens.setup_sensitivity(&[ComponentRef::from(p.clone())]).unwrap();
        let sb = sens.sensitivity_block().unwrap().clone();
        let work = &sens.model_instance;
        let free = sb.records[0].free.clone();

        assert!(!work.constraint_data(&DataRef::scalar(inner)).unwrap().active);
        let row = &work.component_items(sb.const_list.unwrap()).unwrap()[0];
        match &work.constraint_data(row).unwrap().relation {
            Relation::Inequality(lhs, _) => {
                assert_eq!(*lhs, Expr::var(free.clone()) * Expr::var(x.clone()));
            }
            other => panic!("unexpected relation {:?}", other),
        }
        let shadow = work.objective(sb.objectives[0]).unwrap();
        assert_eq!(shadow.expr, Expr::var(free) * Expr::var(x));
        assert_eq!(work.local_name(sb.objectives[0]).unwrap(), "cost");
    }

    #[test]
    fn test_substitute_name_collision() {
        let mut m = Model::new("collide");
        let root = m.root();
        let b1 = m.add_block(root, "b1").unwrap();
        let b2 = m.add_block(root, "b2").unwrap();
        let p1 = m.add_param(b1, "p", ParamComponent::scalar(1.0, true)).unwrap();
        let p2 = m.add_param(b2, "p", ParamComponent::scalar(2.0, true)).unwrap();
        let mut sens = SensitivityInterface::new(m, true);
        sens.setup_sensitivity(&[ComponentRef::whole(p1), ComponentRef::whole(p2)]).unwrap();
        let records = sens.records().to_vec();
        let work = &sens.model_instance;
        assert_eq!(work.local_name(records[0].free.component).unwrap(), "p");
        assert_eq!(work.local_name(records[1].free.component).unwrap(), "p_1");
        assert_eq!(records[1].list_index, 1);
    }

    #[test]
    fn test_suffix_catalogue_idempotent() {
        let mut m = fixed_var_model();
        m.suffixes.declare("dual", SuffixDirection::Import);
        let y = id(&m, "y");
        let mut sens = SensitivityInterface::new(m, false);
        sens.setup_sensitivity(&[ComponentRef::whole(y)]).unwrap();
        let store = &sens.model_instance.suffixes;
        assert_eq!(
            store.names().count(),
            SIPOPT_SUFFIXES.len() + K_AUG_SUFFIXES.len()
        );
        assert_eq!(store.slot("dual").unwrap().direction, SuffixDirection::Import);
    }

    #[test]
    fn test_perturbation_length_and_order() {
        let m = scalar_param_model();
        let p = id(&m, "p");
        let mut sens = SensitivityInterface::new(m, true);
        let err = sens
            .perturb_parameters(&[PerturbValue::Scalar(1.0)])
            .unwrap_err();
        assert!(matches!(err, SensitivityError::Configuration(_)));
        sens.setup_sensitivity(&[ComponentRef::whole(p)]).unwrap();
        let err = sens
            .perturb_parameters(&[PerturbValue::Scalar(1.0), PerturbValue::Scalar(2.0)])
            .unwrap_err();
        assert!(matches!(err, SensitivityError::Configuration(msg) if msg.contains("perturbList")));
    }

    #[test]
    fn test_perturbation_from_other_model() {
        let mut other = Model::new("other");
        let root = other.root();
        let q = other
            .add_param(root, "q", ParamComponent::indexed(vec![(1, 3.0), (2, 4.0)], true))
            .unwrap();
        let value = PerturbValue::from_component(&other, &ComponentRef::whole(q)).unwrap();
        assert_eq!(
            value,
            PerturbValue::Indexed(vec![(Index::Int(1), 3.0), (Index::Int(2), 4.0)])
        );
        let single = PerturbValue::from_component(&other, &ComponentRef::element(q, 2)).unwrap();
        assert_eq!(single, PerturbValue::Scalar(4.0));
        assert!(PerturbValue::Indexed(vec![]).resolve(&None).is_err());

        let parsed: Vec<PerturbValue> = serde_json::from_str("[7.0, [[1, 2.5]]]").unwrap();
        assert_eq!(parsed[0], PerturbValue::Scalar(7.0));
        assert_eq!(parsed[1], PerturbValue::Indexed(vec![(Index::Int(1), 2.5)]));
    }

    #[test]
    fn test_clone_leaves_user_model_untouched() {
        let m = scalar_param_model();
        let snapshot = m.clone();
        let p = id(&m, "p");
        let mut sens = SensitivityInterface::new(m, true);
        sens.setup_sensitivity(&[ComponentRef::whole(p)]).unwrap();
        assert_eq!(*sens.original_model(), snapshot);
        assert_ne!(sens.model_instance, snapshot);
    }

    #[test]
    fn test_component_uid() {
        let uid = ComponentUid::parse("unit.p[1,'a']").unwrap();
        assert_eq!(uid.to_string(), "unit.p[1,'a']");
        let bare = ComponentUid::parse("unit.p[2, b]").unwrap();
        assert_eq!(bare.to_string(), "unit.p[2,'b']");
        assert!(ComponentUid::parse("unit..p").is_err());
        assert!(ComponentUid::parse("p[]").is_err());
        let spaced = ComponentUid::parse("p[ 1 , 'a' ]").unwrap();
        assert_eq!(spaced.to_string(), "p[1,'a']");
        for malformed in ["p[1.5]", "p[1 2]", "p[1,]", "p[,1]", "p[1,,2]", "p[2a]"] {
            assert!(
                matches!(
                    ComponentUid::parse(malformed),
                    Err(SensitivityError::Resolution(msg)) if msg.contains("malformed")
                ),
                "{} should not parse",
                malformed
            );
        }

        let mut original = Model::new("orig");
        let unit = original.add_block(original.root(), "unit").unwrap();
        let p = original
            .add_param(unit, "p", ParamComponent::indexed(vec![(1, 1.0), (2, 2.0)], true))
            .unwrap();
        let uid = ComponentUid::from_component(&original, &ComponentRef::element(p, 2)).unwrap();
        assert_eq!(uid.to_string(), "unit.p[2]");

        // same layout, different ids
        let mut other = Model::new("other");
        other.add_block(other.root(), "spacer").unwrap();
        let unit2 = other.add_block(other.root(), "unit").unwrap();
        let p2 = other
            .add_param(unit2, "p", ParamComponent::indexed(vec![(1, 0.0), (2, 0.0)], true))
            .unwrap();
        let found = uid.find_component_on(&other).unwrap();
        assert_eq!(found, ComponentRef::element(p2, 2));

        let resolved =
            resolve_components(Some(&original), &other, &[ComponentRef::whole(p)]).unwrap();
        assert_eq!(resolved, vec![ComponentRef::whole(p2)]);

        let empty = Model::new("empty");
        let err = resolve_components(Some(&original), &empty, &[ComponentRef::whole(p)])
            .unwrap_err();
        assert!(matches!(err, SensitivityError::Resolution(_)));
        let err = resolve_components(None, &empty, &[ComponentRef::whole(p)]).unwrap_err();
        assert!(matches!(err, SensitivityError::Resolution(_)));

        let by_path = find_components(&other, &["unit.p[1]".to_string()]).unwrap();
        assert_eq!(by_path, vec![ComponentRef::element(p2, 1)]);
        assert!(find_components(&other, &["unit.p[9]".to_string()]).is_err());
    }
}
