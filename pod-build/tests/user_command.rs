use pod_build::{
    resolve_user, BuildArgs, HostUser, ImageConfig, LookupError, UserCommand, UserError,
    UserLookup,
};

struct Case {
    user: &'static str,
    host_user: Option<HostUser>,
    expected: &'static str,
}

fn host_user(uid: &str, gid: Option<&str>) -> Option<HostUser> {
    Some(HostUser {
        uid: uid.into(),
        gid: gid.map(Into::into),
        name: None,
    })
}

/// Always answers with the same record, or fails when there is none.
struct FixedLookup(Option<HostUser>);

impl UserLookup for FixedLookup {
    fn lookup(&self, name: &str) -> Result<HostUser, LookupError> {
        self.0
            .clone()
            .ok_or_else(|| LookupError::Backend(format!("error while looking up user {}", name)))
    }
}

fn cases() -> Vec<Case> {
    vec![
        Case {
            user: "root",
            host_user: host_user("root", Some("root")),
            expected: "root",
        },
        Case {
            user: "root-add",
            host_user: host_user("root-add", Some("root")),
            expected: "root-add",
        },
        Case {
            user: "0",
            host_user: host_user("0", Some("0")),
            expected: "0",
        },
        Case {
            user: "fakeUser",
            host_user: host_user("fakeUser", Some("fakeUser")),
            expected: "fakeUser",
        },
        Case {
            user: "root:root",
            host_user: host_user("root", Some("some")),
            expected: "root:root",
        },
        Case {
            user: "0:root",
            host_user: host_user("0", None),
            expected: "0:root",
        },
        Case {
            user: "root:0",
            host_user: host_user("root", None),
            expected: "root:0",
        },
        Case {
            user: "0:0",
            host_user: host_user("0", None),
            expected: "0:0",
        },
        Case {
            user: "$envuser",
            host_user: host_user("root", Some("root")),
            expected: "root",
        },
        Case {
            user: "root:$envgroup",
            host_user: host_user("root", None),
            expected: "root:grp",
        },
        Case {
            user: "some:grp",
            host_user: host_user("some", None),
            expected: "some:grp",
        },
        Case {
            user: "some",
            host_user: None,
            expected: "some",
        },
    ]
}

#[test]
fn update_user() {
    for case in cases() {
        let mut config = ImageConfig::with_env(vec!["envuser=root", "envgroup=grp"]);
        let command = UserCommand::new(case.user);
        let lookup = FixedLookup(case.host_user);

        let result = command.execute(&mut config, &BuildArgs::new(Vec::<String>::new()), &lookup);

        assert!(result.is_ok(), "{}: {:?}", command, result);
        assert_eq!(config.user, case.expected, "{}", command);
    }
}

#[test]
fn literal_input_is_kept_whatever_the_lookup_says() {
    let lookups = vec![
        FixedLookup(None),
        FixedLookup(host_user("1000", Some("1000"))),
        FixedLookup(host_user("0", None)),
    ];

    for raw in &["app", "1000", "app:staff", "0:0", "root:wheel"] {
        for lookup in &lookups {
            let config = resolve_user(ImageConfig::default(), raw, &BuildArgs::default(), lookup)
                .unwrap();
            assert_eq!(config.user, *raw);
        }
    }
}

#[test]
fn resolving_twice_is_idempotent() {
    let lookup = FixedLookup(None);
    let args = BuildArgs::default();

    for raw in &["root", "0:root", "some:grp"] {
        let once = resolve_user(ImageConfig::default(), raw, &args, &lookup).unwrap();
        let user = once.user.clone();
        let twice = resolve_user(once, &user, &args, &lookup).unwrap();

        assert_eq!(twice.user, *raw);
    }
}

#[test]
fn unknown_user_without_group() {
    let lookup = |name: &str| -> Result<HostUser, LookupError> {
        Err(LookupError::NotFound(name.into()))
    };

    let config = resolve_user(ImageConfig::default(), "some", &BuildArgs::default(), &lookup)
        .unwrap();

    assert_eq!(config.user, "some");
}

#[test]
fn record_group_is_never_appended() {
    let lookup = FixedLookup(host_user("1000", Some("1000")));

    let config = resolve_user(ImageConfig::default(), "app", &BuildArgs::default(), &lookup)
        .unwrap();

    assert_eq!(config.user, "app");
}

#[test]
fn variables_expand_to_environment_values() {
    let config = ImageConfig::with_env(vec!["UID=1001", "GROUP=staff", "UID=1002"]);
    let lookup = FixedLookup(None);

    let config = resolve_user(config, "${UID}:$GROUP", &BuildArgs::default(), &lookup).unwrap();

    assert_eq!(config.user, "1002:staff");
}

#[test]
fn unresolved_variables_are_kept_literally() {
    let lookup = FixedLookup(None);

    let config = resolve_user(
        ImageConfig::default(),
        "$missing:${group}",
        &BuildArgs::default(),
        &lookup,
    )
    .unwrap();

    assert_eq!(config.user, "$missing:${group}");
}

#[test]
fn build_args_substitute_and_env_overrides_them() {
    let mut args = BuildArgs::new(vec!["user=builder", "group=builders", "shell=sh"]);
    args.declare("user", None);
    args.declare("group", Some("users".into()));

    let lookup = FixedLookup(None);

    let config = resolve_user(ImageConfig::default(), "$user:$group", &args, &lookup).unwrap();
    assert_eq!(config.user, "builder:builders");

    let config = ImageConfig::with_env(vec!["group=wheel"]);
    let config = resolve_user(config, "$user:$group", &args, &lookup).unwrap();
    assert_eq!(config.user, "builder:wheel");

    let config = resolve_user(ImageConfig::default(), "$shell", &args, &lookup).unwrap();
    assert_eq!(config.user, "$shell");
}

#[test]
fn only_the_user_field_changes() {
    let json = r#"{
        "Env": ["name=app"],
        "User": "root",
        "WorkingDir": "/srv",
        "Labels": { "maintainer": "someone" }
    }"#;

    let config: ImageConfig = serde_json::from_str(json).unwrap();
    let before = config.clone();

    let config = resolve_user(config, "$name", &BuildArgs::default(), &FixedLookup(None)).unwrap();

    assert_eq!(config.user, "app");
    assert_eq!(config.env, before.env);
    assert_eq!(config.other, before.other);
}

#[test]
fn malformed_input_is_an_error() {
    let lookup = FixedLookup(None);
    let args = BuildArgs::default();

    let err = resolve_user(ImageConfig::default(), "", &args, &lookup).unwrap_err();
    assert!(matches!(err, UserError::Empty));

    let err = resolve_user(ImageConfig::default(), "a:b:c", &args, &lookup).unwrap_err();
    assert!(matches!(err, UserError::TooManySeparators(_)));

    let err = resolve_user(ImageConfig::default(), "app:${group", &args, &lookup).unwrap_err();
    assert!(matches!(err, UserError::Substitution(_)));
}
