/// The sections of the site that are announced but not open yet
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Module {
    NftMarket,
    DaoGovernance,
    AiChat,
    Gaming,
    Crowdfunding,
    Tools,
}

pub struct Feature {
    pub icon: &'static str,
    pub title: &'static str,
    pub description: &'static str,
}

pub struct ModuleInfo {
    pub title: &'static str,
    pub icon: &'static str,
    pub description: &'static str,
    pub features: &'static [Feature],
    pub benefits: &'static [(&'static str, &'static str)],
    pub expected_launch: &'static str,
}

impl Module {
    pub const ALL: [Module; 6] = [
        Module::NftMarket,
        Module::DaoGovernance,
        Module::AiChat,
        Module::Gaming,
        Module::Crowdfunding,
        Module::Tools,
    ];

    pub fn slug(self) -> &'static str {
        match self {
            Module::NftMarket => "nft-market",
            Module::DaoGovernance => "dao-governance",
            Module::AiChat => "ai-chat",
            Module::Gaming => "gaming",
            Module::Crowdfunding => "crowdfunding",
            Module::Tools => "tools",
        }
    }

    pub fn from_slug(slug: &str) -> Option<Module> {
        Module::ALL.into_iter().find(|m| m.slug() == slug)
    }

    pub fn info(self) -> &'static ModuleInfo {
        match self {
            Module::NftMarket => &NFT_MARKET,
            Module::DaoGovernance => &DAO_GOVERNANCE,
            Module::AiChat => &AI_CHAT,
            Module::Gaming => &GAMING,
            Module::Crowdfunding => &CROWDFUNDING,
            Module::Tools => &TOOLS,
        }
    }
}

static NFT_MARKET: ModuleInfo = ModuleInfo {
    title: "NFT Market",
    icon: "🎨",
    description: "A decentralized marketplace for digital art, connecting creators and collectors.",
    features: &[
        Feature {
            icon: "🎨",
            title: "Creation tools",
            description: "Simple tools to create and mint NFTs.",
        },
        Feature {
            icon: "🛒",
            title: "Decentralized trading",
            description: "Secure on-chain trading with several payment currencies.",
        },
        Feature {
            icon: "🏆",
            title: "Rarity ranking",
            description: "Find out which collectibles are really rare.",
        },
        Feature {
            icon: "🔒",
            title: "Copyright protection",
            description: "Ownership of every work is recorded on chain.",
        },
    ],
    benefits: &[
        ("Low fees", "Layer 2 settlement keeps trading cheap."),
        ("Cross-chain", "Trade assets across several networks."),
    ],
    expected_launch: "Q2 2024",
};

static DAO_GOVERNANCE: ModuleInfo = ModuleInfo {
    title: "DAO Governance",
    icon: "🏛️",
    description: "Community decision making: proposals, votes and a shared treasury.",
    features: &[
        Feature {
            icon: "🗳️",
            title: "Proposals and votes",
            description: "Anyone holding governance tokens can propose and vote.",
        },
        Feature {
            icon: "💰",
            title: "Treasury",
            description: "Community funds, spent only by passed proposals.",
        },
        Feature {
            icon: "⏳",
            title: "Time locks",
            description: "Accepted changes wait before being executed.",
        },
        Feature {
            icon: "🤝",
            title: "Delegation",
            description: "Delegate your voting power to someone you trust.",
        },
    ],
    benefits: &[
        ("Really decentralized", "No single party controls the outcome."),
        ("Progressive", "Control moves to the community step by step."),
    ],
    expected_launch: "Q3 2024",
};

static AI_CHAT: ModuleInfo = ModuleInfo {
    title: "AI Chat",
    icon: "🤖",
    description: "An assistant to talk with, code with and learn with.",
    features: &[
        Feature {
            icon: "💬",
            title: "Conversation",
            description: "Natural conversation about any topic.",
        },
        Feature {
            icon: "👨‍💻",
            title: "Coding help",
            description: "Explanations, reviews and snippets.",
        },
        Feature {
            icon: "📚",
            title: "Study partner",
            description: "Learn at your own pace.",
        },
        Feature {
            icon: "🛡️",
            title: "Privacy",
            description: "Your conversations stay yours.",
        },
    ],
    benefits: &[
        ("Always on", "Available at any hour."),
        ("Personal", "Adapts to how you work."),
    ],
    expected_launch: "Q1 2024",
};

static GAMING: ModuleInfo = ModuleInfo {
    title: "Gaming Hub",
    icon: "🎮",
    description: "On-chain games where players own what they earn.",
    features: &[
        Feature {
            icon: "⛓️",
            title: "Blockchain games",
            description: "Game items are real on-chain assets.",
        },
        Feature {
            icon: "🏅",
            title: "Tournaments",
            description: "Compete with other players for prizes.",
        },
        Feature {
            icon: "🛡️",
            title: "Guilds",
            description: "Team up and share rewards.",
        },
    ],
    benefits: &[
        ("Real ownership", "Your items belong to you."),
        ("Fair play", "Game rules are public and verifiable."),
    ],
    expected_launch: "Q4 2024",
};

static CROWDFUNDING: ModuleInfo = ModuleInfo {
    title: "Crowdfunding",
    icon: "💡",
    description: "Fund ideas you believe in, with the money held by smart contracts.",
    features: &[
        Feature {
            icon: "🚀",
            title: "Launch a project",
            description: "Present your idea and set a goal.",
        },
        Feature {
            icon: "📜",
            title: "Smart contracts",
            description: "Funds are released when milestones are met.",
        },
        Feature {
            icon: "📈",
            title: "Progress tracking",
            description: "Backers follow every step of the project.",
        },
    ],
    benefits: &[
        ("Low barrier", "Anyone can start a project."),
        ("Community review", "Backers evaluate projects together."),
    ],
    expected_launch: "Q3 2024",
};

static TOOLS: ModuleInfo = ModuleInfo {
    title: "Toolbox",
    icon: "🛠️",
    description: "Everyday tools for wallets, data and smart contracts.",
    features: &[
        Feature {
            icon: "👛",
            title: "Wallet tools",
            description: "Manage several wallets in one place.",
        },
        Feature {
            icon: "📊",
            title: "Analytics",
            description: "On-chain data, charted.",
        },
        Feature {
            icon: "⛽",
            title: "Gas optimization",
            description: "Send transactions when they are cheapest.",
        },
        Feature {
            icon: "🔍",
            title: "Security checks",
            description: "Scan contracts before interacting with them.",
        },
    ],
    benefits: &[
        ("All in one", "No need to juggle a dozen sites."),
        ("Open source", "Free to use and to audit."),
    ],
    expected_launch: "Q2 2024",
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slugs_are_unique_and_parse_back() {
        for m in Module::ALL {
            assert_eq!(Module::from_slug(m.slug()), Some(m));
            assert!(!m.info().features.is_empty());
        }
        assert_eq!(Module::from_slug("nope"), None);
    }
}
