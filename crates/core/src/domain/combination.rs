use std::fmt;
use std::str::FromStr;

use rand::Rng;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::error::{CoreError, CoreResult};

/// Declares a roulette dimension: a closed enum serialized as its reel label.
macro_rules! dimension {
    (
        $(#[$meta:meta])*
        $name:ident ($dimension:tt) {
            $( $(#[$vmeta:meta])* $variant:ident => $label:tt ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
        #[cfg_attr(feature = "typescript", derive(ts_rs::TS))]
        #[cfg_attr(feature = "typescript", ts(export))]
        pub enum $name {
            $(
                $(#[$vmeta])*
                #[serde(rename = $label)]
                $variant,
            )+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $label,)+
                }
            }

            pub fn parse(s: &str) -> Option<Self> {
                match s {
                    $($label => Some(Self::$variant),)+
                    _ => None,
                }
            }

            fn pick<R: Rng + ?Sized>(rng: &mut R) -> Self {
                Self::ALL[rng.gen_range(0..Self::ALL.len())]
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = CoreError;

            fn from_str(s: &str) -> CoreResult<Self> {
                Self::parse(s).ok_or_else(|| CoreError::UnknownDimensionValue {
                    dimension: $dimension,
                    value: s.to_string(),
                })
            }
        }
    };
}

dimension! {
    /// Target market the product competes in
    Market("market") {
        Saas => "SaaS",
        ECommerce => "E-commerce",
        FinTech => "FinTech",
        HealthTech => "HealthTech",
        EdTech => "EdTech",
        Gaming => "Gaming",
        CreatorEconomy => "Creator Economy",
        RealEstate => "Real Estate",
        Travel => "Travel",
        FoodAndBeverage => "Food & Beverage",
        Fitness => "Fitness",
        Productivity => "Productivity",
    }
}

dimension! {
    /// Who the product is built for
    UserType("user type") {
        SmallBusinesses => "Small Businesses",
        Freelancers => "Freelancers",
        Students => "Students",
        RemoteWorkers => "Remote Workers",
        ContentCreators => "Content Creators",
        Parents => "Parents",
        Seniors => "Seniors",
        Developers => "Developers",
        Designers => "Designers",
        Consultants => "Consultants",
    }
}

dimension! {
    ProblemType("problem type") {
        Automation => "Automation",
        Organization => "Organization",
        Communication => "Communication",
        Analytics => "Analytics",
        Monetization => "Monetization",
        Learning => "Learning",
        HealthTracking => "Health Tracking",
        TimeManagement => "Time Management",
        Collaboration => "Collaboration",
        Security => "Security",
    }
}

dimension! {
    /// Delivery surface of the product
    TechStack("tech stack") {
        WebApp => "Web App",
        MobileApp => "Mobile App",
        BrowserExtension => "Browser Extension",
        ApiMcp => "API/MCP",
        ChatBot => "Slack/Discord Bot",
    }
}

dimension! {
    /// Build-time budget, ordered from smallest to largest.
    #[derive(PartialOrd, Ord, Default)]
    ProjectScope("project scope") {
        #[default]
        Weekend => "Weekend Project",
        OneWeek => "1 Week Sprint",
        OneMonth => "1 Month Build",
        ThreeMonths => "3 Month Project",
        SixMonths => "6 Month Journey",
    }
}

impl ProjectScope {
    /// Qualitative feature complexity expected for this tier.
    pub fn complexity(&self) -> &'static str {
        match self {
            Self::Weekend => {
                "A tiny MVP buildable in 48 hours: 2-3 simple features, no auth or payments, \
                 off-the-shelf services wherever possible"
            }
            Self::OneWeek => {
                "A focused tool shippable in 7 days: one core workflow done well, basic auth, \
                 a simple landing page"
            }
            Self::OneMonth => {
                "A complete first version: several connected features, user accounts, \
                 payments and one or two third-party integrations"
            }
            Self::ThreeMonths => {
                "A polished product: multiple workflows, team or sharing features, analytics \
                 dashboards and a handful of integrations"
            }
            Self::SixMonths => {
                "An ambitious platform: advanced or AI-assisted features, scalable architecture, \
                 an integration ecosystem and room for enterprise customers"
            }
        }
    }
}

/// One spin of the roulette.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[cfg_attr(feature = "typescript", derive(ts_rs::TS))]
#[cfg_attr(feature = "typescript", ts(export))]
#[serde(rename_all = "camelCase")]
pub struct Combination {
    pub market: Market,
    pub user_type: UserType,
    pub problem_type: ProblemType,
    pub tech_stack: TechStack,
    pub project_scope: ProjectScope,
}

impl Combination {
    pub fn new(
        market: Market,
        user_type: UserType,
        problem_type: ProblemType,
        tech_stack: TechStack,
        project_scope: ProjectScope,
    ) -> Self {
        Self {
            market,
            user_type,
            problem_type,
            tech_stack,
            project_scope,
        }
    }

    /// Draw every dimension uniformly at random.
    pub fn random() -> Self {
        Self::random_with(&mut rand::thread_rng())
    }

    pub fn random_with<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self {
            market: Market::pick(rng),
            user_type: UserType::pick(rng),
            problem_type: ProblemType::pick(rng),
            tech_stack: TechStack::pick(rng),
            project_scope: ProjectScope::pick(rng),
        }
    }
}

impl fmt::Display for Combination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} / {} / {} / {} / {}",
            self.market, self.user_type, self.problem_type, self.tech_stack, self.project_scope
        )
    }
}
